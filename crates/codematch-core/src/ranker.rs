use crate::embeddings::util::cosine_similarity;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch<Id> {
    pub id: Id,
    pub score: f64,
}

/// Orders `candidates` by cosine similarity to `query`, highest first, and
/// keeps the first `top_n`. Equal scores keep their input order.
pub fn rank<Id: Clone>(
    query: &[f32],
    candidates: &[(Id, Vec<f32>)],
    top_n: usize,
) -> anyhow::Result<Vec<RankedMatch<Id>>> {
    let mut scored = Vec::with_capacity(candidates.len());
    for (id, vector) in candidates {
        let score = cosine_similarity(query, vector)?;
        scored.push(RankedMatch {
            id: id.clone(),
            score,
        });
    }
    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);
    Ok(scored)
}

pub fn best_match<Id: Clone>(
    query: &[f32],
    candidates: &[(Id, Vec<f32>)],
) -> anyhow::Result<Option<RankedMatch<Id>>> {
    Ok(rank(query, candidates, 1)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<(&'static str, Vec<f32>)> {
        vec![
            ("a", vec![1.0, 0.0, 0.0]),
            ("b", vec![0.9, 0.1, 0.0]),
            ("c", vec![0.0, 1.0, 0.0]),
            ("d", vec![-1.0, 0.0, 0.0]),
            ("e", vec![0.0, 0.0, 0.0]),
        ]
    }

    #[test]
    fn empty_candidates_yield_empty() -> anyhow::Result<()> {
        let empty: Vec<(i64, Vec<f32>)> = Vec::new();
        assert!(rank(&[1.0, 2.0], &empty, 3)?.is_empty());
        assert!(best_match(&[1.0, 2.0], &empty)?.is_none());
        Ok(())
    }

    #[test]
    fn length_is_min_of_top_n_and_candidates() -> anyhow::Result<()> {
        let c = corpus();
        assert_eq!(rank(&[1.0, 0.0, 0.0], &c, 3)?.len(), 3);
        assert_eq!(rank(&[1.0, 0.0, 0.0], &c, 50)?.len(), c.len());
        assert!(rank(&[1.0, 0.0, 0.0], &c, 0)?.is_empty());
        Ok(())
    }

    #[test]
    fn sorted_descending() -> anyhow::Result<()> {
        let out = rank(&[1.0, 0.0, 0.0], &corpus(), 10)?;
        let ids: Vec<_> = out.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a", "b", "c", "e", "d"]);
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
        Ok(())
    }

    #[test]
    fn reordering_input_keeps_the_ranking() -> anyhow::Result<()> {
        let mut c = corpus();
        let q = [0.2, 0.7, 0.1];
        let before: Vec<_> = rank(&q, &c, 10)?.into_iter().map(|m| m.id).collect();
        c.reverse();
        let after: Vec<_> = rank(&q, &c, 10)?.into_iter().map(|m| m.id).collect();
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn ties_keep_input_order() -> anyhow::Result<()> {
        let c = vec![
            (1, vec![2.0, 0.0]),
            (2, vec![1.0, 0.0]),
            (3, vec![5.0, 0.0]),
        ];
        let ids: Vec<_> = rank(&[1.0, 0.0], &c, 3)?.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn self_similarity_is_one() -> anyhow::Result<()> {
        let v = vec![0.12, -0.5, 0.33, 0.9];
        let top = best_match(&v, &[(7, v.clone())])?.expect("one candidate");
        assert_eq!(top.id, 7);
        assert!((top.score - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn dims_mismatch_is_rejected() {
        let c = vec![(1, vec![1.0, 0.0, 0.0])];
        assert!(rank(&[1.0, 0.0], &c, 1).is_err());
    }
}
