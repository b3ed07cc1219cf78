// Shop service fixture - payload types referenced by the captured traffic
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: String,
    pub revision: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Shipped,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrder {
    pub customer: String,
    pub location: Point,
    pub skus: [String; 3],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Order {
    #[serde(flatten)]
    pub audit: Audit,
    pub id: u64,
    pub status: Status,
    #[serde(rename = "deliverTo")]
    pub location: Point,
    pub parent: Option<Box<Order>>,
    pub previous: Box<Self>,
    #[serde(skip)]
    pub internal_note: String,
}
