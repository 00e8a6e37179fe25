use percolator::{AttributeDefinition, Percolator};
use rust_decimal::Decimal;

fn main() {
    let attributes = [
        AttributeDefinition::integer("exchange_id"),
        AttributeDefinition::float("bidfloor"),
        AttributeDefinition::string_list("deal_ids"),
    ];
    let mut percolator = Percolator::new(&attributes).unwrap();
    percolator
        .insert(1, r#"deal_ids contains "deal-1" and bidfloor < 2.5"#)
        .unwrap();
    percolator.insert(2, "exchange_id = 5").unwrap();

    let mut builder = percolator.make_event();
    builder.with_integer("exchange_id", 5).unwrap();
    builder.with_float("bidfloor", Decimal::new(175, 2)).unwrap();
    builder
        .with_string_list("deal_ids", &["deal-3", "deal-1"])
        .unwrap();
    let event = builder.build();

    let report = percolator.search(&event);
    for id in report.matches() {
        println!("matched subscription {id}");
    }
}
