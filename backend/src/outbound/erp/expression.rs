//! Rendering of typed [`Criteria`] into the ERP expression language.

use crate::domain::{Criteria, CriteriaValue};

/// Render `criteria` as an ERP filter expression.
///
/// Numbers are unquoted, text is single-quoted with embedded quotes doubled,
/// and case-insensitive comparisons upper-case both sides. Substring terms
/// escape `%` and `_` so they match literally.
pub(crate) fn render(criteria: &Criteria) -> String {
    match criteria {
        Criteria::Eq(field, value) => format!("{field} = {}", literal(value)),
        Criteria::EqIgnoreCase(field, value) => {
            format!("UPPER({field}) = {}", quote(&value.to_uppercase()))
        }
        Criteria::ContainsIgnoreCase(field, value) => {
            format!(
                "UPPER({field}) LIKE {} ESCAPE {}",
                quote(&format!("%{}%", escape_like(&value.to_uppercase()))),
                quote(LIKE_ESCAPE)
            )
        }
        Criteria::In(_, values) if values.is_empty() => "1 = 0".to_owned(),
        Criteria::In(field, values) => {
            let list = values.iter().map(literal).collect::<Vec<_>>().join(", ");
            format!("{field} IN ({list})")
        }
        Criteria::And(clauses) if clauses.is_empty() => "1 = 1".to_owned(),
        Criteria::And(clauses) => clauses
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(" AND "),
        Criteria::Or(clauses) if clauses.is_empty() => "1 = 0".to_owned(),
        Criteria::Or(clauses) => {
            let joined = clauses
                .iter()
                .map(|clause| match clause {
                    Criteria::And(_) => format!("({})", render(clause)),
                    _ => render(clause),
                })
                .collect::<Vec<_>>()
                .join(" OR ");
            format!("({joined})")
        }
    }
}

fn literal(value: &CriteriaValue) -> String {
    match value {
        CriteriaValue::Number(number) => number.to_string(),
        CriteriaValue::Text(text) => quote(text),
    }
}

const LIKE_ESCAPE: &str = "\\";

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push_str(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::numeric(Criteria::eq("CODUSUARIO", 7_i64), "CODUSUARIO = 7")]
    #[case::text(Criteria::active(), "ATIVO = 'S'")]
    #[case::quoted(Criteria::eq("NOME", "O'Brien"), "NOME = 'O''Brien'")]
    #[case::key_like(
        Criteria::Eq("CODFUNIL", CriteriaValue::key("12")),
        "CODFUNIL = 12"
    )]
    #[case::key_text(
        Criteria::Eq("CODFUNIL", CriteriaValue::key("F-1")),
        "CODFUNIL = 'F-1'"
    )]
    #[case::upper_eq(
        Criteria::EqIgnoreCase("EMAIL", "Ana@Example.com".into()),
        "UPPER(EMAIL) = 'ANA@EXAMPLE.COM'"
    )]
    #[case::like(
        Criteria::ContainsIgnoreCase("NOME", "d'ar".into()),
        r"UPPER(NOME) LIKE '%D''AR%' ESCAPE '\'"
    )]
    #[case::like_wildcards(
        Criteria::ContainsIgnoreCase("EMAIL", "john_doe".into()),
        r"UPPER(EMAIL) LIKE '%JOHN\_DOE%' ESCAPE '\'"
    )]
    #[case::like_percent_and_escape(
        Criteria::ContainsIgnoreCase("NOME", r"50%\off".into()),
        r"UPPER(NOME) LIKE '%50\%\\OFF%' ESCAPE '\'"
    )]
    #[case::in_list(
        Criteria::In("CODFUNIL", vec![1_i64.into(), 2_i64.into()]),
        "CODFUNIL IN (1, 2)"
    )]
    #[case::empty_in(Criteria::In("CODFUNIL", Vec::new()), "1 = 0")]
    fn renders_leaf_clauses(#[case] criteria: Criteria, #[case] expected: &str) {
        assert_eq!(render(&criteria), expected);
    }

    #[rstest]
    fn renders_conjunction_of_scoping_clauses() {
        let criteria = Criteria::active().and(Criteria::eq("CODUSUARIO", 7_i64));
        assert_eq!(render(&criteria), "ATIVO = 'S' AND CODUSUARIO = 7");
    }

    #[rstest]
    fn parenthesises_disjunctions() {
        let criteria = Criteria::Or(vec![
            Criteria::ContainsIgnoreCase("NOME", "a".into()),
            Criteria::ContainsIgnoreCase("EMAIL", "a".into()),
        ])
        .and(Criteria::active());
        assert_eq!(
            render(&criteria),
            r"(UPPER(NOME) LIKE '%A%' ESCAPE '\' OR UPPER(EMAIL) LIKE '%A%' ESCAPE '\') AND ATIVO = 'S'"
        );
    }
}
