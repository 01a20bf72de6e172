//! Strength expansion and the ascending-index combination generator.

use ct_ir::types::{ParamId, Strength};

use crate::assembler::{AssembleError, Assembler};
use crate::diagnostics::ErrorLogger;

/// Every `t`-element subset of `0..n`, each as an ascending index list,
/// in lexicographic order.
pub fn combinations(n: usize, t: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if t > n {
        return out;
    }
    let mut current = Vec::with_capacity(t);
    extend(n, t, 0, &mut current, &mut out);
    out
}

fn extend(n: usize, t: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    if current.len() == t {
        out.push(current.clone());
        return;
    }
    // Leave room for the indices still to be chosen.
    let last = n - (t - current.len());
    for i in start..=last {
        current.push(i);
        extend(n, t, i + 1, current, out);
        current.pop();
    }
}

/// The `degree`-subsets of a strength's parameter list.
pub fn subsets(strength: &Strength) -> Vec<Vec<ParamId>> {
    combinations(strength.pids.len(), strength.degree)
        .into_iter()
        .map(|idx| idx.into_iter().map(|i| strength.pids[i]).collect())
        .collect()
}

impl<L: ErrorLogger> Assembler<L> {
    /// Parameters that are neither aux nor auto, in declaration order.
    pub fn eligible_params(&self) -> Vec<ParamId> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, spec)| spec.is_coverable())
            .map(|(pid, _)| pid)
            .collect()
    }

    /// Cover every eligible parameter together at degree `degree`.
    pub fn default_strength(&mut self, degree: usize) -> Result<Strength, AssembleError> {
        let pids = self.eligible_params();
        self.push_strength(pids, degree)
    }

    /// Strength over the named parameters. `default` stands for the whole
    /// eligible set; the resulting id list is sorted and duplicate-free.
    pub fn named_strength<S: AsRef<str>>(
        &mut self,
        identifiers: &[S],
        degree: usize,
    ) -> Result<Strength, AssembleError> {
        let mut pids = Vec::new();
        for ident in identifiers {
            let ident = ident.as_ref();
            if ident == "default" {
                pids.extend(self.eligible_params());
                continue;
            }
            let Some(pid) = self.find_param(ident) else {
                return self.fail(AssembleError::UnknownParam(ident.to_string()));
            };
            if self.params[pid].is_auto() {
                return self.fail(AssembleError::AutoInStrength(ident.to_string()));
            }
            pids.push(pid);
        }
        pids.sort_unstable();
        pids.dedup();
        self.push_strength(pids, degree)
    }

    fn push_strength(
        &mut self,
        pids: Vec<ParamId>,
        degree: usize,
    ) -> Result<Strength, AssembleError> {
        if pids.len() < degree {
            return self.fail(AssembleError::StrengthTooLarge {
                available: pids.len(),
                degree,
            });
        }
        let strength = Strength { pids, degree };
        tracing::debug!(pids = ?strength.pids, degree, "added strength");
        self.strengths.push(strength.clone());
        Ok(strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_four_choose_two() {
        assert_eq!(
            combinations(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
            ]
        );
    }

    #[test]
    fn test_edge_degrees() {
        assert_eq!(combinations(3, 0), vec![Vec::<usize>::new()]);
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
    }

    #[test]
    fn test_subsets_map_positions_to_ids() {
        let strength = Strength {
            pids: vec![2, 5, 7],
            degree: 2,
        };
        assert_eq!(subsets(&strength), vec![vec![2, 5], vec![2, 7], vec![5, 7]]);
    }

    fn binomial(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    proptest! {
        #[test]
        fn combinations_are_counted_and_ordered(n in 0usize..9, t in 0usize..6) {
            let combos = combinations(n, t);
            let expected = if t > n { 0 } else { binomial(n, t) };
            prop_assert_eq!(combos.len(), expected);
            for c in &combos {
                prop_assert_eq!(c.len(), t);
                prop_assert!(c.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(c.iter().all(|&i| i < n));
            }
            prop_assert!(combos.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
