//! Module containing initialization routines for the conditional probability tables of a network.

use table::ProbabilityTable;
use util::{AugurError, Result};

use itertools::Itertools;
use ndarray::prelude as nd;
use ndarray_rand::RandomExt;
use rand::distributions::Range;

/// Defines possible ways to initialize a `RandomVariable`s CPT.
pub enum Initialization<'a> {
    /// A uniform distribution over the domain, for every parent assignment
    Uniform,

    /// Randomly initialize the rows of the CPT.
    Random,

    /// Initialize the CPT as a Binomial distribution with parameter ```p``` (the probability of
    /// the first value). Valid only for a binary `RandomVariable` with no parents.
    Binomial(f64),

    /// Initialize the CPT as a Multinomial distribution with parameters ```p_0, p_1...```.
    /// Valid only for a `RandomVariable` with no parents.
    Multinomial(&'a [f64]),

    /// User defined CPT
    Table(ProbabilityTable)
}


/// Every combination of parent values, in row-major order (the last parent varies fastest).
pub fn parent_combinations(parent_domains: &[Vec<String>]) -> Vec<Vec<String>> {
    if parent_domains.is_empty() {
        return vec![vec![]];
    }

    parent_domains.iter()
                  .map(|d| d.iter().cloned())
                  .multi_cartesian_product()
                  .collect()
}


impl<'a> Initialization<'a> {

    /// Construct a CPT, initialized based on ```self```
    ///
    /// # Args
    /// * `cardinality`: the size of the domain of the variable
    /// * `parent_domains`: the domains of the parents, in parent order
    ///
    /// # Returns
    /// a `ProbabilityTable` with a row for every combination of parent values. A user defined
    /// table is returned as is; the variable and network validate it.
    pub fn build_table(self, cardinality: usize, parent_domains: &[Vec<String>]) -> Result<ProbabilityTable> {
        ///////////////////////////////////////////////////////////////////////////////
        // Trivial cases
        if let Initialization::Table(t) = self {
            return Ok(t);
        }

        if cardinality == 0 {
            return Err(AugurError::InvalidInitialization);
        }

        ///////////////////////////////////////////////////////////////////////////////
        // Check for errors
        if parent_domains.is_empty() {
            match self {
                // A binomial distribution on a non-binary variable
                Initialization::Binomial(_) if cardinality != 2 => {
                    return Err(AugurError::InvalidInitialization);
                },

                // A multinomial distribution with an incorrect number of parameters
                Initialization::Multinomial(ps) if ps.len() != cardinality => {
                    return Err(AugurError::InvalidInitialization);
                },

                _ => ()
            }
        } else {
            match self {
                // A binomial/multinomial on a variable with parents
                Initialization::Binomial(_) | Initialization::Multinomial(_) => {
                    return Err(AugurError::InvalidInitialization);
                },

                _ => ()
            }
        }

        ///////////////////////////////////////////////////////////////////////////////
        // now, build the table
        let keys = parent_combinations(parent_domains);

        let rows: Vec<Vec<f64>> = match self {
            Initialization::Uniform => {
                let val = 1. / (cardinality as f64);
                keys.iter().map(|_| vec![val; cardinality]).collect()
            },
            Initialization::Random => {
                let tbl = nd::Array::random((keys.len(), cardinality), Range::new(1.0, 100.0));
                let z = tbl.sum_axis(nd::Axis(1));
                (0..keys.len())
                    .map(|i| (0..cardinality).map(|j| tbl[[i, j]] / z[i]).collect())
                    .collect()
            },
            Initialization::Binomial(p) => {
                vec![vec![p, 1.0 - p]]
            },
            Initialization::Multinomial(ps) => {
                vec![ps.to_vec()]
            },
            Initialization::Table(_) => unreachable!()
        };

        let mut table = ProbabilityTable::new();
        for (key, row) in keys.into_iter().zip(rows.into_iter()) {
            table.insert(key, row);
        }

        Ok(table)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std;

    fn binary() -> Vec<String> {
        vec![String::from("false"), String::from("true")]
    }

    #[test]
    fn combinations() {
        let domains = vec![binary(), vec![String::from("a"), String::from("b"), String::from("c")]];
        let combos = parent_combinations(&domains);

        assert_eq!(6, combos.len());
        assert_eq!(combos[0], vec!["false", "a"]);
        assert_eq!(combos[1], vec!["false", "b"]);
        assert_eq!(combos[5], vec!["true", "c"]);

        assert_eq!(parent_combinations(&[]), vec![Vec::<String>::new()]);
    }

    #[test]
    fn uniform_init() {
        let domains = vec![binary(), binary()];
        let table = Initialization::Uniform.build_table(3, &domains).unwrap();

        assert_eq!(4, table.len());
        for (_, row) in table.rows() {
            assert_eq!(3, row.len());
            for &p in row {
                assert!((p - 1. / 3.).abs() < std::f64::EPSILON);
            }
        }
    }

    #[test]
    fn random_init() {
        let domains = vec![binary()];
        let table = Initialization::Random.build_table(4, &domains).unwrap();

        assert_eq!(2, table.len());
        for (_, row) in table.rows() {
            let sum: f64 = row.iter().sum();
            assert!((1.0 - sum).abs() < 1e-9);
            assert!(row.iter().all(|&p| p > 0.0));
        }
    }

    #[test]
    fn binomial_init() {
        let table = Initialization::Binomial(0.25).build_table(2, &[]).unwrap();
        let empty: [&str; 0] = [];
        assert_eq!(Some(&[0.25, 0.75][..]), table.row(&empty));

        assert!(Initialization::Binomial(0.25).build_table(3, &[]).is_err());
        assert!(Initialization::Binomial(0.25).build_table(2, &[binary()]).is_err());
    }

    #[test]
    fn multinomial_init() {
        let table = Initialization::Multinomial(&[0.1, 0.7, 0.2]).build_table(3, &[]).unwrap();
        let empty: [&str; 0] = [];
        assert_eq!(Some(&[0.1, 0.7, 0.2][..]), table.row(&empty));

        match Initialization::Multinomial(&[0.5, 0.5]).build_table(3, &[]) {
            Err(AugurError::InvalidInitialization) => (),
            other => panic!("unexpected result {:?}", other)
        }
        assert!(Initialization::Multinomial(&[0.5, 0.5]).build_table(2, &[binary()]).is_err());
    }

    #[test]
    fn table_init() {
        let t = ProbabilityTable::new()
            .with_row(&["false"], &[0.9, 0.1])
            .with_row(&["true"], &[0.3, 0.7]);
        let built = Initialization::Table(t.clone()).build_table(2, &[binary()]).unwrap();
        assert_eq!(t, built);
    }
}
