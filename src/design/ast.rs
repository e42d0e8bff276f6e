//! Abstract Syntax Tree types for report designs

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared type of a parameter or expression value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValueType {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    /// A compiled report handle, supplied at fill time
    Report,
}

impl ValueType {
    /// Keyword used for this type in design source
    pub fn keyword(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
            ValueType::Report => "report",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(ValueType::String),
            "number" => Some(ValueType::Number),
            "boolean" => Some(ValueType::Boolean),
            "object" => Some(ValueType::Object),
            "report" => Some(ValueType::Report),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Band of a report that elements are laid out in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Title,
    PageHeader,
    ColumnHeader,
    Detail,
    ColumnFooter,
    PageFooter,
    Summary,
}

impl SectionKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            SectionKind::Title => "title",
            SectionKind::PageHeader => "page_header",
            SectionKind::ColumnHeader => "column_header",
            SectionKind::Detail => "detail",
            SectionKind::ColumnFooter => "column_footer",
            SectionKind::PageFooter => "page_footer",
            SectionKind::Summary => "summary",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "title" => Some(SectionKind::Title),
            "page_header" => Some(SectionKind::PageHeader),
            "column_header" => Some(SectionKind::ColumnHeader),
            "detail" => Some(SectionKind::Detail),
            "column_footer" => Some(SectionKind::ColumnFooter),
            "page_footer" => Some(SectionKind::PageFooter),
            "summary" => Some(SectionKind::Summary),
            _ => None,
        }
    }
}

/// Expression text together with the type of value it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub text: String,
    pub value_type: ValueType,
}

impl Expression {
    /// Create a `string`-typed expression
    pub fn new(text: impl Into<String>) -> Self {
        Self::typed(text, ValueType::String)
    }

    pub fn typed(text: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            text: text.into(),
            value_type,
        }
    }
}

/// Parameter declaration: `parameter Title: string`
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub name: Identifier,
    pub value_type: ValueType,
}

/// Embedded child report
#[derive(Debug, Clone, PartialEq)]
pub struct SubreportElement {
    /// Expression identifying the embedded report, e.g. `"InvoiceLines"`
    pub expression: Expression,
}

/// Element placed inside a section
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Literal text: `text "Invoice"`
    StaticText(String),
    /// Evaluated text: ``textfield `$F{customer.name}` ``
    TextField(Expression),
    /// Sub-report placeholder: ``subreport `"InvoiceLines"` ``
    Subreport(SubreportElement),
}

impl Element {
    pub fn text(text: impl Into<String>) -> Self {
        Element::StaticText(text.into())
    }

    pub fn field(expression: impl Into<String>) -> Self {
        Element::TextField(Expression::new(expression))
    }

    pub fn subreport(expression: impl Into<String>) -> Self {
        Element::Subreport(SubreportElement {
            expression: Expression::new(expression),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub elements: Vec<Spanned<Element>>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            elements: Vec::new(),
        }
    }

    /// Append an element without a source location
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(Spanned::new(element, 0..0));
        self
    }
}

/// Position of an element inside a design: section index, then element index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub section: usize,
    pub index: usize,
}

/// Root AST node - one report template
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub name: String,
    pub parameters: Vec<Spanned<ParameterDecl>>,
    pub sections: Vec<Section>,
}

impl Design {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Declare a parameter without a source location
    pub fn with_parameter(mut self, name: &str, value_type: ValueType) -> Self {
        self.parameters.push(Spanned::new(
            ParameterDecl {
                name: Identifier::new(name),
                value_type,
            },
            0..0,
        ));
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Find a parameter declaration by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterDecl> {
        self.parameters
            .iter()
            .map(|p| &p.node)
            .find(|p| p.name.as_str() == name)
    }

    pub fn element(&self, at: ElementRef) -> Option<&Spanned<Element>> {
        self.sections.get(at.section)?.elements.get(at.index)
    }

    pub fn element_mut(&mut self, at: ElementRef) -> Option<&mut Spanned<Element>> {
        self.sections.get_mut(at.section)?.elements.get_mut(at.index)
    }
}
