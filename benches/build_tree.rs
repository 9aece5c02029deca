//! This bench test simulates enriching a large extracted finding aid: many
//! groups, each with slash-path series and parenthetical items, plus a
//! scattering of malformed rows.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion};
use fonds::{
    domain::ExtractedField,
    pipeline::{self, Document},
    Config, Record,
};

/// Generates a large ordered record list with realistic token shapes.
fn preseed_document() -> Document {
    let mut records = Vec::new();
    let mut push = |reference: &str| {
        records.push(Record::new(records.len(), reference));
    };

    for group in 1..=200 {
        push(&format!("{group}."));
        for series in 1..=5 {
            push(&format!("{group}/{series}"));
            for item in 1..=4 {
                push(&format!("({item})"));
            }
        }
        // A malformed row every few groups.
        if group % 7 == 0 {
            push("illegible");
        }
    }

    for (i, record) in records.iter_mut().enumerate() {
        if i % 3 == 0 {
            record.series = ExtractedField::new("Correspondence");
        }
        if i % 4 == 0 {
            record.date_start_raw = Some("14-15 Oct 1839".to_string());
        } else if i % 4 == 1 {
            record.date_start_raw = Some("1910-1915".to_string());
        }
    }

    Document {
        name: "bench".to_string(),
        records,
    }
}

fn process_document(c: &mut Criterion) {
    let document = preseed_document();
    let config = Config::default();

    c.bench_function("process document", |b| {
        b.iter(|| pipeline::process_document(std::hint::black_box(&document), &config));
    });
}

criterion_group!(benches, process_document);
criterion_main!(benches);
