use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("'{0}' is not a seed; expected an unsigned integer")]
    NotANumber(String),
    #[error("no seeds given")]
    Empty,
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse comma-separated seeds. `a..b` expands to the half-open range.
pub fn parse_seeds(s: &str) -> Result<Vec<u64>, SeedError> {
    let mut seeds = Vec::new();
    for token in split_csv(s) {
        if let Some((start, end)) = token.split_once("..") {
            let start = parse_seed(start)?;
            let end = parse_seed(end)?;
            seeds.extend(start..end);
        } else {
            seeds.push(parse_seed(&token)?);
        }
    }
    if seeds.is_empty() {
        return Err(SeedError::Empty);
    }
    Ok(seeds)
}

fn parse_seed(token: &str) -> Result<u64, SeedError> {
    token
        .trim()
        .parse()
        .map_err(|_| SeedError::NotANumber(token.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn seeds_accept_lists_and_ranges() {
        assert_eq!(parse_seeds("7, 3..6").unwrap(), vec![7, 3, 4, 5]);
        assert_eq!(parse_seeds("1337").unwrap(), vec![1337]);
    }

    #[test]
    fn bad_seeds_are_reported() {
        assert_eq!(
            parse_seeds("12,abc").unwrap_err(),
            SeedError::NotANumber("abc".to_string())
        );
        assert_eq!(parse_seeds(" , ").unwrap_err(), SeedError::Empty);
        assert_eq!(parse_seeds("5..5").unwrap_err(), SeedError::Empty);
    }
}
