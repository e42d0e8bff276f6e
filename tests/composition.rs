//! End-to-end composition tests over design sources

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use report_composer::compiler::{CompiledElement, SubreportSource};
use report_composer::composition::placeholders;
use report_composer::design::{SectionKind, ValueType};
use report_composer::{
    compose, compose_with_config, parse, ComposeError, Composer, ComposerConfig, DesignCompiler,
    DirectoryStore, ParameterValue, ReportError, StandardCompiler, TemplateRegistry,
};

const INVOICE: &str = include_str!("fixtures/invoice.rdl");
const INVOICE_LINES: &str = include_str!("fixtures/invoice_lines.rdl");
const TOTALS: &str = include_str!("fixtures/totals.rdl");
const PLAIN: &str = include_str!("fixtures/plain.rdl");

fn registry() -> TemplateRegistry {
    let mut store = TemplateRegistry::new();
    store.register_source(INVOICE_LINES).unwrap();
    store.register_source(TOTALS).unwrap();
    store
}

fn composer(store: &TemplateRegistry) -> Composer<&TemplateRegistry, StandardCompiler> {
    Composer::new(store, StandardCompiler)
}

#[test]
fn test_design_without_placeholders_compiles_as_is() {
    let store = registry();
    let package = composer(&store).compose(parse(PLAIN).unwrap()).unwrap();

    let direct = StandardCompiler.compile(&parse(PLAIN).unwrap()).unwrap();
    assert!(package.subreports().is_empty());
    assert_eq!(package.bindings().count(), 0);
    assert_eq!(package.report(), &direct);
}

#[test]
fn test_each_placeholder_gets_subreport_and_binding() {
    let store = registry();
    let package = composer(&store).compose(parse(INVOICE).unwrap()).unwrap();

    let names: Vec<&str> = package.subreports().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["InvoiceLines", "Totals"]);
    assert_eq!(
        package.binding_names(),
        &["InvoiceLines".to_string(), "Totals".to_string()]
    );
    for (name, subreport) in package.bindings() {
        assert_eq!(name, subreport.name());
    }
}

#[test]
fn test_master_declares_report_parameters() {
    let store = registry();
    let package = composer(&store).compose(parse(INVOICE).unwrap()).unwrap();
    let report = package.report();

    assert_eq!(
        report.parameter("InvoiceLines").map(|p| p.value_type),
        Some(ValueType::Report)
    );
    assert_eq!(
        report.parameter("Totals").map(|p| p.value_type),
        Some(ValueType::Report)
    );
    // Pre-existing parameters are untouched
    assert_eq!(
        report.parameter("Customer").map(|p| p.value_type),
        Some(ValueType::String)
    );
    assert_eq!(report.subreport_parameters(), vec!["InvoiceLines", "Totals"]);
}

#[test]
fn test_rewritten_design_references_parameters() {
    let store = registry();
    let mut master = parse(INVOICE).unwrap();
    composer(&store).compose_in_place(&mut master).unwrap();

    let expressions: Vec<String> = placeholders(&master).map(|p| p.expression).collect();
    assert_eq!(expressions, vec!["$P{InvoiceLines}", "$P{Totals}"]);

    let printed = master.to_string();
    assert!(!printed.contains("\"InvoiceLines\"`"));
    assert!(printed.contains("subreport `$P{InvoiceLines}`: report"));
    assert!(printed.contains("parameter InvoiceLines: report"));
}

#[test]
fn test_compiled_master_detail_uses_parameter() {
    let store = registry();
    let package = composer(&store).compose(parse(INVOICE).unwrap()).unwrap();

    let detail = package
        .report()
        .sections()
        .iter()
        .find(|s| s.kind == SectionKind::Detail)
        .unwrap();
    assert_eq!(
        detail.elements,
        vec![CompiledElement::Subreport(SubreportSource::Parameter(
            "InvoiceLines".to_string()
        ))]
    );
}

#[test]
fn test_missing_template_aborts() {
    let store = TemplateRegistry::new();
    let err = composer(&store).compose(parse(INVOICE).unwrap()).unwrap_err();

    match err {
        ComposeError::ReferenceNotFound { name, .. } => assert_eq!(name, "InvoiceLines"),
        other => panic!("Expected ReferenceNotFound, got {other}"),
    }
}

#[test]
fn test_later_missing_template_still_aborts() {
    let mut store = TemplateRegistry::new();
    store.register_source(INVOICE_LINES).unwrap();

    let err = composer(&store).compose(parse(INVOICE).unwrap()).unwrap_err();
    assert_eq!(err.template_name(), Some("Totals"));
}

#[test]
fn test_repeated_reference_shares_one_subreport() {
    let store = registry();
    let master = parse(
        r#"
        report "Statement" {
            section detail {
                subreport `"InvoiceLines"`
            }
            section summary {
                subreport `"InvoiceLines"`
            }
        }
    "#,
    )
    .unwrap();
    let package = composer(&store).compose(master).unwrap();

    assert_eq!(package.subreports().len(), 1);
    assert_eq!(package.report().subreport_parameters(), vec!["InvoiceLines"; 2]);
    assert_eq!(
        package
            .report()
            .parameters()
            .iter()
            .filter(|p| p.name.as_str() == "InvoiceLines")
            .count(),
        1
    );
}

#[test]
fn test_non_literal_reference_is_malformed() {
    let store = registry();
    let master = parse(r#"report "M" { section detail { subreport `42 + 1` } }"#).unwrap();
    let err = composer(&store).compose(master).unwrap_err();

    match err {
        ComposeError::MalformedReference { expression, .. } => assert_eq!(expression, "42 + 1"),
        other => panic!("Expected MalformedReference, got {other}"),
    }
}

#[test]
fn test_binding_conflicts_with_existing_parameter() {
    let store = registry();
    let master = parse(
        r#"
        report "M" {
            parameter InvoiceLines: string
            section detail { subreport `"InvoiceLines"` }
        }
    "#,
    )
    .unwrap();
    let err = composer(&store).compose(master).unwrap_err();

    assert!(matches!(
        err,
        ComposeError::DuplicateBindingConflict {
            existing: ValueType::String,
            ..
        }
    ));
}

#[test]
fn test_invalid_sub_template_is_compile_failure() {
    let mut store = TemplateRegistry::new();
    store
        .register_source(r#"report "Broken" { section detail { textfield `$P{Nope}` } }"#)
        .unwrap();
    let master = parse(r#"report "M" { section detail { subreport `"Broken"` } }"#).unwrap();

    let err = composer(&store).compose(master).unwrap_err();
    assert!(matches!(err, ComposeError::SubCompileFailure { ref name, .. } if name == "Broken"));
    assert!(err.to_string().contains("undeclared parameter 'Nope'"));
}

#[test]
fn test_parameters_merge_for_fill() {
    let store = registry();
    let package = composer(&store).compose(parse(INVOICE).unwrap()).unwrap();

    let mut extra = HashMap::new();
    extra.insert("Customer".to_string(), ParameterValue::from("ACME"));
    extra.insert("Totals".to_string(), ParameterValue::from("shadowed"));
    let parameters = package.parameters(extra);

    assert_eq!(parameters.len(), 3);
    assert_eq!(parameters["Customer"], ParameterValue::from("ACME"));
    let totals = parameters["Totals"].as_report().unwrap();
    assert_eq!(totals.name(), "Totals");
}

#[test]
fn test_directory_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("InvoiceLines.rdl"), INVOICE_LINES).unwrap();
    std::fs::write(dir.path().join("Totals.rdl"), TOTALS).unwrap();

    let store = DirectoryStore::new(dir.path());
    let package = compose(INVOICE, &store).unwrap();

    assert_eq!(package.report().name(), "Invoice");
    assert_eq!(package.subreports().len(), 2);
}

#[test]
fn test_directory_store_reports_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("InvoiceLines.rdl"), "report {").unwrap();

    let store = DirectoryStore::new(dir.path());
    let err = compose(INVOICE, &store).unwrap_err();

    assert!(matches!(
        err,
        ReportError::Compose(ComposeError::Store { ref name, .. }) if name == "InvoiceLines"
    ));
}

#[test]
fn test_nested_templates_compose_with_config() {
    let mut store = TemplateRegistry::new();
    store
        .register_source(r#"report "Outer" { section detail { subreport `"Totals"` } }"#)
        .unwrap();
    store.register_source(TOTALS).unwrap();
    let master = r#"report "M" { section detail { subreport `"Outer"` } }"#;

    let config = ComposerConfig::new().with_nested(true);
    let package = compose_with_config(master, &store, &config).unwrap();

    assert_eq!(
        package.binding_names(),
        &["Totals".to_string(), "Outer".to_string()]
    );
    let outer = package.binding("Outer").unwrap();
    assert_eq!(outer.subreport_parameters(), vec!["Totals"]);
}

#[test]
fn test_compositions_run_in_parallel() {
    let store = registry();

    let packages: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| composer(&store).compose(parse(INVOICE).unwrap())))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = packages[0].as_ref().unwrap();
    for package in &packages {
        assert_eq!(package.as_ref().unwrap().report(), first.report());
    }
}

#[test]
fn test_emitted_design_parses_back() {
    let store = registry();
    let mut master = parse(INVOICE).unwrap();
    composer(&store).compose_in_place(&mut master).unwrap();

    let printed = master.to_string();
    let reparsed = parse(&printed).unwrap();

    assert_eq!(reparsed.to_string(), printed);
    let names = |design: &report_composer::Design| -> Vec<String> {
        design
            .parameters
            .iter()
            .map(|p| p.node.name.to_string())
            .collect()
    };
    assert_eq!(names(&reparsed), names(&master));
    assert_eq!(
        StandardCompiler.compile(&reparsed).unwrap(),
        StandardCompiler.compile(&master).unwrap()
    );
}

#[test]
fn test_names_that_cannot_be_parameters_are_malformed() {
    let mut store = TemplateRegistry::new();
    for name in ["Invoice Lines", "Invoice-Lines", "text", "2024Lines"] {
        store.register(report_composer::Design::new(name)).unwrap();
    }

    for name in ["Invoice Lines", "Invoice-Lines", "text", "2024Lines"] {
        let source = format!(
            r#"report "M" {{ section detail {{ subreport `"{}"` }} }}"#,
            name
        );
        let err = composer(&store).compose(parse(&source).unwrap()).unwrap_err();
        assert!(
            matches!(err, ComposeError::MalformedReference { .. }),
            "{name}: {err}"
        );
    }
}

#[test]
fn test_nested_binding_cannot_shadow_master_parameter() {
    let mut store = registry();
    store
        .register_source(r#"report "Outer" { section detail { subreport `"Totals"` } }"#)
        .unwrap();
    let master = r#"
        report "M" {
            parameter Totals: string
            section title { textfield `$P{Totals}` }
            section detail { subreport `"Outer"` }
        }
    "#;

    let config = ComposerConfig::new().with_nested(true);
    let err = compose_with_config(master, &store, &config).unwrap_err();

    assert!(matches!(
        err,
        ReportError::Compose(ComposeError::DuplicateBindingConflict {
            ref name,
            existing: ValueType::String,
            ..
        }) if name == "Totals"
    ));
}
