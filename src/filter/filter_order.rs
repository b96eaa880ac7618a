use super::error::FilterError;
use super::filter_where::quote_column;
use super::types::FilterOrderInfo;

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() { return Ok(String::new()); }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            parts.push(format!("{} {}", quote_column(info.column)?, info.sort.to_sql()));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::NEWEST_FIRST;

    #[test]
    fn newest_first_breaks_ties_by_id() {
        assert_eq!(
            FilterOrder::generate(NEWEST_FIRST).unwrap(),
            "ORDER BY \"created_at\" DESC, \"id\" DESC"
        );
    }

    #[test]
    fn no_order_is_empty() {
        assert_eq!(FilterOrder::generate(&[]).unwrap(), "");
    }
}
