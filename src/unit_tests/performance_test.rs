#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;
    use arrow::array::{Int32Array, RecordBatch, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;
    use parquet::basic::Compression;
    use parquet::file::properties::WriterProperties;
    use rand::{Rng, SeedableRng};
    use crate::ParquetSource;
    use crate::column_parquet_reader::ParquetLoader;
    use crate::config::SearchFields;
    use crate::registry::{DatasetRegistry, Region};
    use crate::searching::query_matcher::search;
    use crate::searching::result_formatter::{format, HighlightStyle};
    use crate::searching::search_results::SearchTerms;

    const TOTAL_ROWS: usize = 100_000;

    const GIVEN_NAMES: &[&str] = &[
        "பிரகாஷ்", "கண்ணன்", "முருகன்", "செல்வி", "லட்சுமி",
        "Ravi", "KUMAR", "Selvam", "Devi", "Anand",
    ];
    const FAMILY_NAMES: &[&str] = &[
        "வேலுசாமி", "ராமசாமி", "பழனிசாமி", "சுப்பிரமணியம்",
        "Raman", "Velusamy", "PALANI", "Krishnan",
    ];

    struct GeneratedRoll {
        parquet: Vec<u8>,
        names: Vec<String>,
        relations: Vec<String>,
    }

    fn generate_roll() -> Result<GeneratedRoll, Box<dyn std::error::Error + Send + Sync>> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(12345);

        let mut names = Vec::with_capacity(TOTAL_ROWS);
        let mut relations = Vec::with_capacity(TOTAL_ROWS);
        for _ in 0..TOTAL_ROWS {
            let given = GIVEN_NAMES[rng.random_range(0..GIVEN_NAMES.len())];
            let family = FAMILY_NAMES[rng.random_range(0..FAMILY_NAMES.len())];
            names.push(format!("{} {}", given, family));
            relations.push(FAMILY_NAMES[rng.random_range(0..FAMILY_NAMES.len())].to_string());
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("SLNOINPART", DataType::Int32, false),
            Field::new("FM_NAME_V2", DataType::Utf8, false),
            Field::new("RLN_FM_NM_V2", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from((0..TOTAL_ROWS as i32).collect::<Vec<_>>())),
                Arc::new(StringArray::from(names.clone())),
                Arc::new(StringArray::from(relations.clone())),
            ],
        )?;

        let mut parquet = Vec::new();
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .set_max_row_group_size(25_000)
            .build();
        let mut writer = ArrowWriter::try_new(&mut parquet, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        Ok(GeneratedRoll { parquet, names, relations })
    }

    /// Reference answer straight from the generated strings. The generated
    /// text is already NFC with single spaces, so lowercase containment is
    /// the whole rule here.
    fn expected_rows(roll: &GeneratedRoll, name: &str, relation: &str) -> Vec<u32> {
        let (name, relation) = (name.to_lowercase(), relation.to_lowercase());
        (0..TOTAL_ROWS)
            .filter(|&i| {
                (name.is_empty() || roll.names[i].to_lowercase().contains(&name))
                    && (relation.is_empty() || roll.relations[i].to_lowercase().contains(&relation))
            })
            .map(|i| i as u32)
            .collect()
    }

    #[tokio::test]
    async fn test_large_region_search() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("\n=== Performance Test: {} row region ===\n", TOTAL_ROWS);
        let roll = generate_roll()?;
        println!("Parquet size: {:.2} MB", roll.parquet.len() as f64 / (1024.0 * 1024.0));

        let registry = DatasetRegistry::new(
            vec![Region::new("116 - Tiruppur", ParquetSource::from(roll.parquet.clone()))],
            SearchFields::default(),
            Arc::new(ParquetLoader),
        );

        let start = Instant::now();
        let table = registry.get("116 - Tiruppur").await?;
        println!("Load + normalize + prepare: {:?}", start.elapsed());
        assert_eq!(table.num_rows(), TOTAL_ROWS);

        let queries = [
            ("பிரகாஷ்", "வேலுசாமி"),
            ("kumar", ""),
            ("", "SAMY"),
            ("Ravi Raman", ""),
            ("சாமி", "ராம"),
            ("ANAND palani", "krishnan"),
            ("not a name", ""),
        ];

        for (name, relation) in queries {
            let start = Instant::now();
            let result = search(&table, &SearchTerms::new(name, relation))?;
            let elapsed = start.elapsed();
            println!("  {:?} / {:?}: {} rows in {:?}", name, relation, result.len(), elapsed);

            assert_eq!(result.row_indices, expected_rows(&roll, name, relation),
                       "mismatch for name={:?} relation={:?}", name, relation);
        }

        // Formatting the biggest result set
        let result = search(&table, &SearchTerms::new("a", ""))?;
        let start = Instant::now();
        let formatted = format(&result, HighlightStyle::Html)?;
        println!("Formatted {} rows ({} byte export) in {:?}",
                 formatted.rows.len(), formatted.export.len(), start.elapsed());
        assert_eq!(formatted.rows.len(), result.len());

        Ok(())
    }
}
