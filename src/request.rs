use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
}

impl Pagination {
    // page numbering starts at 1; anything below must not reach Postgres as
    // a negative OFFSET
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.size
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_offset_never_negative() {
        assert_eq!(Pagination { page: 3, size: 20 }.offset(), 40);
        assert_eq!(Pagination { page: 1, size: 20 }.offset(), 0);
        assert_eq!(Pagination { page: 0, size: 20 }.offset(), 0);
        assert_eq!(Pagination { page: -3, size: 20 }.offset(), 0);
    }
}
