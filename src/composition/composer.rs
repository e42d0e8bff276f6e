//! Composition orchestration
//!
//! For every placeholder of the master, in document order: resolve the
//! template name, load and compile the template, record the artifact and
//! rewrite the placeholder to a parameter reference. Once all placeholders
//! are bound, the rewritten master itself is compiled.
//!
//! With nested composition enabled, every loaded template is composed the
//! same way before it is compiled, and the chain of templates currently
//! being composed guards against cycles.

use std::collections::HashMap;

use crate::compiler::DesignCompiler;
use crate::design::{Design, ValueType};
use crate::template::TemplateStore;

use super::error::ComposeError;
use super::package::ComposedReport;
use super::resolver::{load, reference_name};
use super::rewriter::DesignRewriter;
use super::scanner::{placeholders, Placeholder};

/// State shared by all levels of one composition
struct Composition<A> {
    /// Compiled sub-reports in completion order
    compiled: Vec<(String, A)>,
    index: HashMap<String, usize>,
    /// Templates currently being composed, outermost first
    chain: Vec<String>,
    /// Parameters the master declared before composition; bindings fill the
    /// master's parameter map, so none may reuse these names
    reserved: HashMap<String, ValueType>,
}

impl<A: Clone> Composition<A> {
    fn new(master: &Design) -> Self {
        Self {
            compiled: Vec::new(),
            index: HashMap::new(),
            chain: vec![master.name.clone()],
            reserved: master
                .parameters
                .iter()
                .map(|p| (p.node.name.to_string(), p.node.value_type))
                .collect(),
        }
    }

    fn is_compiled(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn record(&mut self, name: String, artifact: A) {
        self.index.insert(name.clone(), self.compiled.len());
        self.compiled.push((name, artifact));
    }
}

/// Composes master designs with the sub-reports they embed
#[derive(Debug, Clone)]
pub struct Composer<S, C> {
    store: S,
    compiler: C,
    nested: bool,
}

impl<S: TemplateStore, C: DesignCompiler> Composer<S, C> {
    pub fn new(store: S, compiler: C) -> Self {
        Self {
            store,
            compiler,
            nested: false,
        }
    }

    /// Also compose placeholders inside sub-templates
    pub fn with_nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Compose a master design into a report package
    pub fn compose(&self, mut master: Design) -> Result<ComposedReport<C::Artifact>, ComposeError> {
        self.compose_in_place(&mut master)
    }

    /// Compose, leaving the rewritten master design with the caller
    ///
    /// On error the design may be partially rewritten.
    pub fn compose_in_place(
        &self,
        master: &mut Design,
    ) -> Result<ComposedReport<C::Artifact>, ComposeError> {
        let _span = tracing::debug_span!("compose", report = %master.name).entered();

        let mut composition = Composition::new(master);
        self.bind_placeholders(master, &mut composition)?;

        let report = self
            .compiler
            .compile(master)
            .map_err(|source| ComposeError::MasterCompileFailure {
                name: master.name.clone(),
                source,
            })?;

        tracing::info!(
            report = %master.name,
            subreports = composition.compiled.len(),
            "composed report"
        );
        Ok(ComposedReport::new(report, composition.compiled))
    }

    fn bind_placeholders(
        &self,
        design: &mut Design,
        composition: &mut Composition<C::Artifact>,
    ) -> Result<(), ComposeError> {
        // Snapshot before rewriting; rewrites address elements by position
        let found: Vec<Placeholder> = placeholders(design).collect();
        let mut rewriter = DesignRewriter::new();

        for placeholder in &found {
            let name = reference_name(placeholder)?;
            if !composition.is_compiled(&name) {
                self.compile_template(&name, placeholder, composition)?;
            }
            rewriter.bind(design, placeholder, &name)?;
        }
        Ok(())
    }

    fn compile_template(
        &self,
        name: &str,
        placeholder: &Placeholder,
        composition: &mut Composition<C::Artifact>,
    ) -> Result<(), ComposeError> {
        if let Some(&existing) = composition.reserved.get(name) {
            return Err(ComposeError::DuplicateBindingConflict {
                name: name.to_string(),
                existing,
                span: placeholder.span.clone(),
            });
        }
        if self.nested && composition.chain.iter().any(|n| n == name) {
            let mut chain = composition.chain.clone();
            chain.push(name.to_string());
            return Err(ComposeError::circular(chain));
        }

        let mut design = load(&self.store, name, placeholder)?;
        tracing::debug!(template = name, "resolved sub-template");

        if self.nested {
            composition.chain.push(name.to_string());
            let nested = self.bind_placeholders(&mut design, composition);
            composition.chain.pop();
            nested?;
        }

        let artifact = self
            .compiler
            .compile(&design)
            .map_err(|source| ComposeError::SubCompileFailure {
                name: name.to_string(),
                source,
            })?;
        tracing::debug!(template = name, "compiled sub-template");

        composition.record(name.to_string(), artifact);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileError, StandardCompiler};
    use crate::design::{Element, Section, SectionKind};
    use crate::template::TemplateRegistry;
    use std::cell::RefCell;

    /// Records every design it is asked to compile
    #[derive(Default)]
    struct RecordingCompiler {
        compiled: RefCell<Vec<String>>,
        reject: Option<String>,
    }

    impl DesignCompiler for RecordingCompiler {
        type Artifact = String;

        fn compile(&self, design: &Design) -> Result<String, CompileError> {
            if self.reject.as_deref() == Some(design.name.as_str()) {
                return Err(CompileError::message("rejected"));
            }
            self.compiled.borrow_mut().push(design.name.clone());
            Ok(design.name.clone())
        }
    }

    fn detail(elements: Vec<Element>) -> Section {
        elements
            .into_iter()
            .fold(Section::new(SectionKind::Detail), |s, e| s.with_element(e))
    }

    fn store(designs: Vec<Design>) -> TemplateRegistry {
        let mut registry = TemplateRegistry::new();
        for design in designs {
            registry.register(design).unwrap();
        }
        registry
    }

    #[test]
    fn test_compiles_subreports_before_master() {
        let store = store(vec![Design::new("A"), Design::new("B")]);
        let compiler = RecordingCompiler::default();
        let composer = Composer::new(&store, &compiler);

        let master = Design::new("M").with_section(detail(vec![
            Element::subreport("\"A\""),
            Element::subreport("\"B\""),
        ]));
        let package = composer.compose(master).unwrap();

        assert_eq!(*compiler.compiled.borrow(), vec!["A", "B", "M"]);
        assert_eq!(package.report(), "M");
        assert_eq!(package.binding_names(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_repeated_reference_compiles_once() {
        let store = store(vec![Design::new("A")]);
        let compiler = RecordingCompiler::default();
        let composer = Composer::new(&store, &compiler);

        let mut master = Design::new("M").with_section(detail(vec![
            Element::subreport("\"A\""),
            Element::subreport(" \"A\" "),
        ]));
        let package = composer.compose_in_place(&mut master).unwrap();

        assert_eq!(*compiler.compiled.borrow(), vec!["A", "M"]);
        assert_eq!(package.subreports().len(), 1);
        assert_eq!(master.parameters.len(), 1);
        assert!(placeholders(&master).all(|p| p.expression == "$P{A}"));
    }

    #[test]
    fn test_sub_compile_failure_aborts() {
        let store = store(vec![Design::new("A")]);
        let compiler = RecordingCompiler {
            reject: Some("A".to_string()),
            ..Default::default()
        };
        let composer = Composer::new(&store, &compiler);

        let master = Design::new("M").with_section(detail(vec![Element::subreport("\"A\"")]));
        let err = composer.compose(master).unwrap_err();

        assert!(matches!(err, ComposeError::SubCompileFailure { ref name, .. } if name == "A"));
        assert!(compiler.compiled.borrow().is_empty());
    }

    #[test]
    fn test_master_compile_failure_is_wrapped() {
        let store = store(vec![]);
        let compiler = RecordingCompiler {
            reject: Some("M".to_string()),
            ..Default::default()
        };
        let err = Composer::new(&store, &compiler)
            .compose(Design::new("M"))
            .unwrap_err();
        assert!(matches!(err, ComposeError::MasterCompileFailure { .. }));
    }

    #[test]
    fn test_single_level_leaves_nested_placeholders() {
        let store = store(vec![
            Design::new("A").with_section(detail(vec![Element::subreport("\"B\"")])),
        ]);
        let compiler = RecordingCompiler::default();
        let composer = Composer::new(&store, &compiler);

        let master = Design::new("M").with_section(detail(vec![Element::subreport("\"A\"")]));
        let package = composer.compose(master).unwrap();

        assert_eq!(package.binding_names(), &["A".to_string()]);
    }

    #[test]
    fn test_nested_composition_orders_descendants_first() {
        let store = store(vec![
            Design::new("A").with_section(detail(vec![Element::subreport("\"B\"")])),
            Design::new("B"),
            Design::new("C"),
        ]);
        let compiler = RecordingCompiler::default();
        let composer = Composer::new(&store, &compiler).with_nested(true);

        let master = Design::new("M").with_section(detail(vec![
            Element::subreport("\"A\""),
            Element::subreport("\"C\""),
        ]));
        let package = composer.compose(master).unwrap();

        assert_eq!(
            package.binding_names(),
            &["B".to_string(), "A".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn test_nested_cycle_is_detected() {
        let store = store(vec![
            Design::new("A").with_section(detail(vec![Element::subreport("\"B\"")])),
            Design::new("B").with_section(detail(vec![Element::subreport("\"A\"")])),
        ]);
        let composer = Composer::new(&store, StandardCompiler).with_nested(true);

        let master = Design::new("M").with_section(detail(vec![Element::subreport("\"A\"")]));
        let err = composer.compose(master).unwrap_err();

        match err {
            ComposeError::CircularReference { chain } => {
                assert_eq!(chain, vec!["M", "A", "B", "A"]);
            }
            other => panic!("Expected circular reference, got {other}"),
        }
    }

    #[test]
    fn test_nested_reference_to_master_is_cycle() {
        let store = store(vec![
            Design::new("A").with_section(detail(vec![Element::subreport("\"M\"")])),
            Design::new("M"),
        ]);
        let composer = Composer::new(&store, StandardCompiler).with_nested(true);

        let master = Design::new("M").with_section(detail(vec![Element::subreport("\"A\"")]));
        assert!(matches!(
            composer.compose(master),
            Err(ComposeError::CircularReference { .. })
        ));
    }

    #[test]
    fn test_shared_nested_template_is_not_a_cycle() {
        let store = store(vec![
            Design::new("A").with_section(detail(vec![Element::subreport("\"C\"")])),
            Design::new("B").with_section(detail(vec![Element::subreport("\"C\"")])),
            Design::new("C"),
        ]);
        let composer = Composer::new(&store, StandardCompiler).with_nested(true);

        let master = Design::new("M").with_section(detail(vec![
            Element::subreport("\"A\""),
            Element::subreport("\"B\""),
        ]));
        let package = composer.compose(master).unwrap();
        assert_eq!(package.subreports().len(), 3);
    }

    #[test]
    fn test_nested_binding_conflicts_with_master_parameter() {
        let store = store(vec![
            Design::new("Outer").with_section(detail(vec![Element::subreport("\"Totals\"")])),
            Design::new("Totals"),
        ]);
        let compiler = RecordingCompiler::default();
        let composer = Composer::new(&store, &compiler).with_nested(true);

        let master = Design::new("M")
            .with_parameter("Totals", ValueType::String)
            .with_section(detail(vec![
                Element::field("$P{Totals}"),
                Element::subreport("\"Outer\""),
            ]));
        let err = composer.compose(master).unwrap_err();

        match err {
            ComposeError::DuplicateBindingConflict { name, existing, .. } => {
                assert_eq!(name, "Totals");
                assert_eq!(existing, ValueType::String);
            }
            other => panic!("Expected binding conflict, got {other}"),
        }
        assert!(compiler.compiled.borrow().is_empty());
    }
}
