use crate::domain::order::Order;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One CSV row per order, in the same field order as the stored record.
#[derive(Serialize)]
struct OrderRow<'a> {
    id: &'a str,
    token: String,
    timestamp: String,
    status: &'static str,
    price: Decimal,
    phone: &'a str,
    details: &'a str,
    file_name: &'a str,
    file_path: &'a str,
}

impl<'a> From<&'a Order> for OrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            id: &order.id.0,
            token: order.token_id.to_string(),
            timestamp: order.timestamp.to_rfc3339(),
            status: order.status.as_str(),
            price: order.price.normalize(),
            phone: &order.phone,
            details: &order.details,
            file_name: &order.file.file_name,
            file_path: &order.file.file_path,
        }
    }
}

/// Writes the order list as CSV.
///
/// Wraps `csv::Writer`; the header row is emitted even when there are no orders.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new().has_headers(false).from_writer(sink);
        Self { writer }
    }

    /// Writes all orders in the order given and flushes the sink.
    pub fn write_orders<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) -> Result<()> {
        self.writer.write_record([
            "id",
            "token",
            "timestamp",
            "status",
            "price",
            "phone",
            "details",
            "file_name",
            "file_path",
        ])?;
        for order in orders {
            self.writer.serialize(OrderRow::from(order))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
