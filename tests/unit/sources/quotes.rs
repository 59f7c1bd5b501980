use super::*;
use serde_json::json;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "quotereel_quotes_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn table(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("quotes.json");
    std::fs::write(
        &path,
        serde_json::to_vec(&json!([
            { "Quote": "Stay hungry.", "Author": "Jobs" },
            { "Quote": "Know thyself.", "Author": "Socrates" },
            { "Quote": 42, "Author": null }
        ]))
        .unwrap(),
    )
    .unwrap();
    path
}

#[test]
fn parse_records_keeps_row_order_and_stringifies_cells() {
    let quotes = parse_records(&json!([
        { "Quote": " a ", "Author": "x" },
        { "Quote": 7, "Author": null, "Extra": true }
    ]))
    .unwrap();
    assert_eq!(
        quotes,
        vec![
            Quote {
                text: "a".into(),
                author: "x".into()
            },
            Quote {
                text: "7".into(),
                author: String::new()
            },
        ]
    );
}

#[test]
fn parse_records_rejects_missing_columns_and_empty_tables() {
    let err = parse_records(&json!([{ "Quote": "q" }])).unwrap_err();
    assert!(matches!(err, ReelError::FatalFetch(_)));
    assert!(err.to_string().contains("Author"));

    assert!(matches!(
        parse_records(&json!([])),
        Err(ReelError::FatalFetch(_))
    ));
    assert!(matches!(
        parse_records(&json!({ "Quote": "q" })),
        Err(ReelError::FatalFetch(_))
    ));
}

#[test]
fn file_source_fetches_rows() {
    let dir = temp_dir("fetch");
    let mut src = JsonTableSource::new(table(&dir));
    let quotes = src.fetch().unwrap();
    assert_eq!(quotes.len(), 3);
    assert_eq!(quotes[1].author, "Socrates");
}

#[test]
fn missing_file_is_fatal_fetch() {
    let dir = temp_dir("missing");
    let mut src = JsonTableSource::new(dir.join("nope.json"));
    assert!(matches!(src.fetch(), Err(ReelError::FatalFetch(_))));
}

#[test]
fn delete_row_shifts_following_rows() {
    let dir = temp_dir("delete");
    let mut src = JsonTableSource::new(table(&dir));
    src.delete_row(0).unwrap();
    let quotes = src.fetch().unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].text, "Know thyself.");
    assert!(src.delete_row(5).is_err());
}

#[test]
fn mark_used_adds_column() {
    let dir = temp_dir("mark");
    let path = table(&dir);
    let mut src = JsonTableSource::new(&path);
    src.mark_used(1).unwrap();
    let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw[1][USED_COLUMN], json!("Yes"));
    assert!(raw[0].get(USED_COLUMN).is_none());
}

struct Flaky {
    delete_ok: bool,
    mark_ok: bool,
    marked: Vec<usize>,
}

impl QuoteSource for Flaky {
    fn fetch(&mut self) -> ReelResult<Vec<Quote>> {
        Ok(Vec::new())
    }

    fn delete_row(&mut self, _row: usize) -> ReelResult<()> {
        if self.delete_ok {
            Ok(())
        } else {
            Err(ReelError::validation("insufficient permissions"))
        }
    }

    fn mark_used(&mut self, row: usize) -> ReelResult<()> {
        if self.mark_ok {
            self.marked.push(row);
            Ok(())
        } else {
            Err(ReelError::validation("insufficient permissions"))
        }
    }
}

#[test]
fn row_policy_delete_falls_back_to_mark() {
    let mut src = Flaky {
        delete_ok: false,
        mark_ok: true,
        marked: Vec::new(),
    };
    assert_eq!(
        apply_row_policy(&mut src, RowPolicy::Delete, 3),
        RowOutcome::Marked
    );
    assert_eq!(src.marked, vec![3]);
}

#[test]
fn row_policy_outcomes() {
    let mut ok = Flaky {
        delete_ok: true,
        mark_ok: true,
        marked: Vec::new(),
    };
    assert_eq!(
        apply_row_policy(&mut ok, RowPolicy::Off, 0),
        RowOutcome::Untouched
    );
    assert_eq!(
        apply_row_policy(&mut ok, RowPolicy::Delete, 0),
        RowOutcome::Deleted
    );

    let mut broken = Flaky {
        delete_ok: false,
        mark_ok: false,
        marked: Vec::new(),
    };
    assert_eq!(
        apply_row_policy(&mut broken, RowPolicy::Delete, 0),
        RowOutcome::Failed
    );
}
