use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct List<T> {
    list: Vec<T>,
    total: i64,
}

impl<T> List<T> {
    pub fn new(list: Vec<T>, total: i64) -> Self {
        List { list, total }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    id: i32,
}

impl CreateResponse {
    pub fn new(id: i32) -> Self {
        Self { id }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    updated: u64,
}

impl UpdateResponse {
    pub fn new(updated: u64) -> Self {
        Self { updated }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    deleted: u64,
}

impl DeleteResponse {
    pub fn new(deleted: u64) -> Self {
        Self { deleted }
    }
}
