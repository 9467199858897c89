//! Small helpers shared across validation and coercion.

use itertools::Itertools as _;

/// Given an invalid input string and a list of valid options, returns a
/// filtered and sorted list of valid options that are lexically close to
/// the input.
pub(crate) fn suggestion_list<'o>(
    input: &str,
    options: impl IntoIterator<Item = &'o str>,
) -> Vec<String> {
    let threshold = input.len() / 2 + 1;
    let mut with_distance: Vec<(String, usize)> = options
        .into_iter()
        .filter_map(|opt| lexical_distance(input, opt, threshold).map(|d| (opt.into(), d)))
        .collect();
    with_distance.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    with_distance.into_iter().map(|(s, _)| s).collect()
}

/// Damerau-Levenshtein distance between `a` and `b`, or `None` when it
/// exceeds `threshold`. A case-only mismatch counts as distance 1.
fn lexical_distance(a: &str, b: &str, threshold: usize) -> Option<usize> {
    if a == b {
        return Some(0);
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.iter().map(|c| c.to_lowercase().to_string()).eq(b.iter().map(|c| c.to_lowercase().to_string())) {
        return Some(1);
    }
    if a.len().abs_diff(b.len()) > threshold {
        return None;
    }

    let mut rows: Vec<Vec<usize>> = vec![vec![0; b.len() + 1]; 3];
    for (j, cell) in rows[0].iter_mut().enumerate() {
        *cell = j;
    }
    for i in 1..=a.len() {
        let cur = i % 3;
        let prev = (i - 1) % 3;
        let prev2 = (i + 1) % 3;
        rows[cur][0] = i;
        let mut smallest = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut value = (rows[prev][j] + 1)
                .min(rows[cur][j - 1] + 1)
                .min(rows[prev][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                value = value.min(rows[prev2][j - 2] + 1);
            }
            rows[cur][j] = value;
            smallest = smallest.min(value);
        }
        if smallest > threshold {
            return None;
        }
    }

    let distance = rows[a.len() % 3][b.len()];
    (distance <= threshold).then_some(distance)
}

/// Formats suggestions into a ` Did you mean ...?` message suffix, or an
/// empty string when there is nothing to suggest.
pub(crate) fn did_you_mean(suggestions: &[String]) -> String {
    const MAX_SUGGESTIONS: usize = 5;

    match suggestions {
        [] => String::new(),
        [single] => format!(" Did you mean \"{single}\"?"),
        many => {
            let all = many.iter().take(MAX_SUGGESTIONS);
            let (init, last) = (all.clone().dropping_back(1), all.last().expect("non-empty"));
            format!(
                " Did you mean {}, or \"{last}\"?",
                init.map(|s| format!("\"{s}\"")).join(", "),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{did_you_mean, suggestion_list};

    #[test]
    fn suggests_close_options() {
        let suggestions = suggestion_list("wriet", ["write", "writer", "banana"]);
        assert_eq!(suggestions, vec!["write".to_string(), "writer".to_string()]);
    }

    #[test]
    fn case_only_mismatch_ranks_first() {
        let suggestions = suggestion_list("requiredfield", ["requiredField", "intField"]);
        assert_eq!(suggestions[0], "requiredField");
    }

    #[test]
    fn formats_did_you_mean() {
        assert_eq!(did_you_mean(&[]), "");
        assert_eq!(did_you_mean(&["a".into()]), " Did you mean \"a\"?");
        assert_eq!(
            did_you_mean(&["a".into(), "b".into()]),
            " Did you mean \"a\", or \"b\"?",
        );
    }
}
