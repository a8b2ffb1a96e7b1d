use sheetgraph::{
    document_from_batch, document_from_columns, extract_named_columns, Cell, DataColumns,
    SheetGraphError,
};

fn col(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::from(*v)).collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn base_columns() -> DataColumns {
    DataColumns {
        node_ids: strings(&["a", "b", "c"]),
        node_labels: Some(strings(&["node a", "node b", "node c"])),
        link_source_ids: strings(&["a", "b"]),
        link_target_ids: strings(&["b", "c"]),
        ..DataColumns::default()
    }
}

#[test]
fn test_extract_empty_matrix() {
    assert_eq!(extract_named_columns(&[], &[]).expect("extract"), vec![]);
    assert_eq!(
        extract_named_columns(&[], &["A"]).expect("extract"),
        vec![None]
    );
}

#[test]
fn test_extract_order_follows_request_not_layout() {
    let matrix = vec![col(&["A", "a1", "a2"]), col(&["B", "b1", "b2"])];
    let result = extract_named_columns(&matrix, &["B", "A"]).expect("extract");
    assert_eq!(result[0], Some(strings(&["b1", "b2"])));
    assert_eq!(result[1], Some(strings(&["a1", "a2"])));
}

#[test]
fn test_extract_stringifies_numeric_cells() {
    let matrix = vec![vec![Cell::from("A"), Cell::Number(2.0)]];
    let result = extract_named_columns(&matrix, &["A"]).expect("extract");
    assert_eq!(result[0], Some(strings(&["2"])));
}

#[test]
fn test_extract_trims_trailing_empties_keeps_interior() {
    let matrix = vec![col(&["A", "a1", "", "a3", "", ""])];
    let result = extract_named_columns(&matrix, &["A"]).expect("extract");
    assert_eq!(result[0], Some(strings(&["a1", "", "a3"])));
}

#[test]
fn test_extract_first_physical_occurrence_wins() {
    let matrix = vec![col(&["A", "first"]), col(&["A", "second"])];
    let result = extract_named_columns(&matrix, &["A"]).expect("extract");
    assert_eq!(result[0], Some(strings(&["first"])));
}

#[test]
fn test_extract_duplicate_request_rejected() {
    let matrix = vec![col(&["A", "a1"])];
    let err = extract_named_columns(&matrix, &["A", "A"]).expect_err("duplicate");
    assert!(matches!(err, SheetGraphError::ConfigurationError(_)));
}

#[test]
fn test_document_from_empty_columns() {
    let doc = document_from_columns(&DataColumns::default());
    assert!(doc.nodes.is_empty());
    assert!(doc.links.is_empty());
}

#[test]
fn test_document_from_columns_basic_nodes_and_links() {
    let doc = document_from_columns(&base_columns());
    assert_eq!(doc.nodes.len(), 3);
    assert_eq!(doc.nodes[0].id.as_deref(), Some("a"));
    assert_eq!(doc.nodes[0].label.as_deref(), Some("node a"));
    assert_eq!(doc.nodes[2].label.as_deref(), Some("node c"));
    // omitted optional columns leave the fields omitted, not null
    assert_eq!(doc.nodes[0].color, None);
    assert_eq!(doc.nodes[0].url, None);

    assert_eq!(doc.links.len(), 2);
    assert_eq!(doc.links[0].source.as_deref(), Some("a"));
    assert_eq!(doc.links[0].target.as_deref(), Some("b"));
    assert_eq!(doc.links[1].source.as_deref(), Some("b"));
    assert_eq!(doc.links[1].target.as_deref(), Some("c"));
}

#[test]
fn test_document_label_falls_back_to_id() {
    let mut columns = base_columns();
    columns.node_labels = Some(strings(&["node a", ""]));
    let doc = document_from_columns(&columns);
    assert_eq!(doc.nodes[0].label.as_deref(), Some("node a"));
    assert_eq!(doc.nodes[1].label.as_deref(), Some("b"));
    assert_eq!(doc.nodes[2].label.as_deref(), Some("c"));

    columns.node_labels = None;
    let doc = document_from_columns(&columns);
    assert_eq!(doc.nodes[0].label.as_deref(), Some("a"));
}

#[test]
fn test_document_empty_color_cell_becomes_explicit_null() {
    let mut columns = base_columns();
    columns.node_colors = Some(strings(&["red", "", "blue"]));
    let doc = document_from_columns(&columns);
    assert_eq!(doc.nodes[0].color, Some(Some("red".to_string())));
    assert_eq!(doc.nodes[1].color, Some(None));
    assert_eq!(doc.nodes[2].color, Some(Some("blue".to_string())));
}

#[test]
fn test_document_rank_parses_permissively() {
    let mut columns = base_columns();
    columns.node_ranks = Some(strings(&["2.5", "", "oops"]));
    let doc = document_from_columns(&columns);
    assert_eq!(doc.nodes[0].rank, Some(Some(2.5)));
    assert_eq!(doc.nodes[1].rank, Some(None));
    let bad = doc.nodes[2].rank.expect("present").expect("value");
    assert!(bad.is_nan());
}

#[test]
fn test_document_stroke_defaulting_and_passthrough() {
    let mut columns = base_columns();
    let doc = document_from_columns(&columns);
    assert_eq!(doc.links[0].stroke.as_deref(), Some("solid"));

    columns.link_strokes = Some(strings(&["dashed", ""]));
    let doc = document_from_columns(&columns);
    assert_eq!(doc.links[0].stroke.as_deref(), Some("dashed"));
    assert_eq!(doc.links[1].stroke.as_deref(), Some("solid"));

    // this path does not validate stroke values
    columns.link_strokes = Some(strings(&["dotted", "solid"]));
    let doc = document_from_columns(&columns);
    assert_eq!(doc.links[0].stroke.as_deref(), Some("dotted"));
    assert_eq!(doc.links[1].stroke.as_deref(), Some("solid"));
}

#[test]
fn test_document_link_missing_endpoint_dropped_silently() {
    let mut columns = base_columns();
    columns.link_source_ids = strings(&["a", "b", "c"]);
    columns.link_target_ids = strings(&["b"]);
    let doc = document_from_columns(&columns);
    assert_eq!(doc.links.len(), 1);
    assert_eq!(doc.links[0].source.as_deref(), Some("a"));
}

#[test]
fn test_batch_import_tolerates_column_order() {
    let nodes = vec![
        col(&["label", "node a", "node b"]),
        col(&["rank", "1", "2"]),
        col(&["id", "a", "b"]),
    ];
    let links = vec![col(&["target", "b"]), col(&["source", "a"])];
    let doc = document_from_batch(&nodes, &links).expect("batch");
    assert_eq!(doc.nodes.len(), 2);
    assert_eq!(doc.nodes[0].id.as_deref(), Some("a"));
    assert_eq!(doc.nodes[0].label.as_deref(), Some("node a"));
    assert_eq!(doc.nodes[0].rank, Some(Some(1.0)));
    assert_eq!(doc.links.len(), 1);
    assert_eq!(doc.links[0].stroke.as_deref(), Some("solid"));
}

#[test]
fn test_batch_import_requires_id_and_endpoint_columns() {
    let nodes = vec![col(&["label", "node a"])];
    let links = vec![col(&["source", "a"]), col(&["target", "b"])];
    let err = document_from_batch(&nodes, &links).expect_err("missing id");
    assert!(matches!(err, SheetGraphError::ConfigurationError(_)));

    let nodes = vec![col(&["id", "a"])];
    let links = vec![col(&["source", "a"])];
    let err = document_from_batch(&nodes, &links).expect_err("missing target");
    assert!(matches!(err, SheetGraphError::ConfigurationError(_)));
}
