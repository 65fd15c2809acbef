use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty list")]
    Empty,
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<ParseError>,
    },
    #[error("element {index}: cannot parse {raw:?} as a number")]
    Number { index: usize, raw: String },
    #[error("element {index}: {value} is not a non-negative integer")]
    NotInteger { index: usize, value: f64 },
}

/// Parses `"1.1, 1.6, 1.9"` or `"[1.1, 1.6, 1.9]"`.
pub fn parse_vector(raw: &str) -> Result<Vec<f64>, ParseError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    if inner.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    inner
        .split(',')
        .enumerate()
        .map(|(index, piece)| {
            let piece = piece.trim();
            piece.parse::<f64>().map_err(|_| ParseError::Number {
                index,
                raw: piece.to_string(),
            })
        })
        .collect()
}

pub fn parse_counts(raw: &str) -> Result<Vec<i64>, ParseError> {
    parse_vector(raw)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            if value.fract() == 0.0 && value >= 0.0 && value <= i64::MAX as f64 {
                Ok(value as i64)
            } else {
                Err(ParseError::NotInteger { index, value })
            }
        })
        .collect()
}

/// Rows are bracketed lists separated by newlines or `;`.
pub fn parse_matrix(raw: &str) -> Result<Vec<Vec<f64>>, ParseError> {
    let rows: Vec<&str> = raw
        .split(['\n', ';'])
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .collect();
    if rows.is_empty() {
        return Err(ParseError::Empty);
    }
    rows.into_iter()
        .enumerate()
        .map(|(row, text)| {
            parse_vector(text).map_err(|source| ParseError::Row {
                row,
                source: Box::new(source),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_counts, parse_matrix, parse_vector, ParseError};

    #[test]
    fn parses_bracketed_and_bare_vectors() {
        assert_eq!(
            parse_vector("[1.1, 1.6, 1.9]").expect("bracketed"),
            vec![1.1, 1.6, 1.9]
        );
        assert_eq!(parse_vector(" 2,3 ").expect("bare"), vec![2.0, 3.0]);
    }

    #[test]
    fn parses_dashboard_style_matrix() {
        let matrix = parse_matrix("[0.04, 0.01, 0.015]\n[0, 0.03, 0.015]\n[0.01, 0, 0.015]\n")
            .expect("matrix");
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[1], vec![0.0, 0.03, 0.015]);

        let inline = parse_matrix("[25, 55, 55]; [0, 60, 70]").expect("inline matrix");
        assert_eq!(inline, vec![vec![25.0, 55.0, 55.0], vec![0.0, 60.0, 70.0]]);
    }

    #[test]
    fn reports_offending_row_and_element() {
        let err = parse_matrix("[1, 2]\n[3, x]").expect_err("bad element");
        assert_eq!(err.to_string(), "row 1: element 1: cannot parse \"x\" as a number");
        assert_eq!(parse_vector("[]"), Err(ParseError::Empty));
    }

    #[test]
    fn counts_must_be_whole_numbers() {
        assert_eq!(parse_counts("50, 55, 60").expect("counts"), vec![50, 55, 60]);
        assert!(matches!(
            parse_counts("50, 5.5"),
            Err(ParseError::NotInteger { index: 1, .. })
        ));
    }
}
