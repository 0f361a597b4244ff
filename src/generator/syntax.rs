//! Language-neutral view of a previously generated source file.
//!
//! The merge engine only needs a few facts about a prior file: which
//! functions it declares (name, parameter types, result types, body span),
//! which import declarations it carries and the values of its top-level
//! string constants. [`SourceSyntax`] produces that
//! view; [`RustSyntax`] is the `syn`-backed implementation used for the
//! generated tool modules.

use std::ops::Range;

use proc_macro2::{LineColumn, Span};
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{Expr, FnArg, GenericArgument, Item, Lit, PathArguments, ReturnType, Type};

/// A function declaration found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFunction {
    pub name: String,
    /// Whitespace-free type text of each parameter, in order.
    pub params: Vec<String>,
    /// Whitespace-free type text of each result, in order.
    pub results: Vec<String>,
    /// Byte span of the body including its delimiters, if the function has one.
    pub body: Option<Range<usize>>,
}

/// One import declaration, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub text: String,
    pub span: Range<usize>,
}

/// Functions and imports of one parsed file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSource {
    pub functions: Vec<SyntaxFunction>,
    pub imports: Vec<ImportDecl>,
    /// Top-level constants initialised with a plain string, `(name, value)`.
    pub string_constants: Vec<(String, String)>,
}

impl ParsedSource {
    /// Value of the top-level string constant `name`, if declared.
    pub fn string_constant(&self, name: &str) -> Option<&str> {
        self.string_constants
            .iter()
            .find(|(constant, _)| constant == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parser for the target language of generated files.
pub trait SourceSyntax {
    /// Parse `source`, returning the parser's message on failure.
    fn parse(&self, source: &str) -> Result<ParsedSource, String>;
}

/// The signature a developer-owned handler must have to be carried over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerShape {
    pub name: String,
    pub param_count: usize,
    pub request_index: usize,
    pub request_type: String,
    pub result_count: usize,
    pub result_index: usize,
    pub result_type: String,
}

impl HandlerShape {
    /// The generated handler shape: `fn name(ctx, request: Req) -> Result<Res, Error>`.
    pub fn tool_handler(name: &str, request_type: &str, result_type: &str) -> Self {
        HandlerShape {
            name: name.to_string(),
            param_count: 2,
            request_index: 1,
            request_type: request_type.to_string(),
            result_count: 2,
            result_index: 0,
            result_type: result_type.to_string(),
        }
    }

    /// Whether `func` has this shape. Functions without a body never match.
    pub fn matches(&self, func: &SyntaxFunction) -> bool {
        func.name == self.name
            && func.body.is_some()
            && func.params.len() == self.param_count
            && func.results.len() == self.result_count
            && func
                .params
                .get(self.request_index)
                .is_some_and(|ty| type_matches(ty, &self.request_type))
            && func
                .results
                .get(self.result_index)
                .is_some_and(|ty| type_matches(ty, &self.result_type))
    }
}

/// Exact match, or `expected` is the last segment of a qualified path.
pub fn type_matches(actual: &str, expected: &str) -> bool {
    let actual: String = actual.chars().filter(|c| !c.is_whitespace()).collect();
    let expected: String = expected.chars().filter(|c| !c.is_whitespace()).collect();
    actual == expected || actual.ends_with(&format!("::{expected}"))
}

/// Join prior imports back into one block.
///
/// The text between two consecutive imports is reused when it holds nothing
/// but whitespace and line comments; anything else is replaced with a single
/// newline.
pub fn join_imports(source: &str, imports: &[ImportDecl]) -> String {
    let mut out = String::new();
    for (i, import) in imports.iter().enumerate() {
        if i > 0 {
            let gap = source
                .get(imports[i - 1].span.end..import.span.start)
                .unwrap_or("\n");
            if is_trivia(gap) && gap.contains('\n') {
                out.push_str(gap);
            } else {
                out.push('\n');
            }
        }
        out.push_str(&import.text);
    }
    out
}

fn is_trivia(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || (line.starts_with("//") && !line.starts_with("///") && !line.starts_with("//!"))
    })
}

/// `syn`-backed parser for Rust sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustSyntax;

impl SourceSyntax for RustSyntax {
    fn parse(&self, source: &str) -> Result<ParsedSource, String> {
        let file = syn::parse_file(source).map_err(|e| {
            let at = e.span().start();
            format!("{e} (line {}, column {})", at.line, at.column + 1)
        })?;
        let index = LineIndex::new(source);
        let mut parsed = ParsedSource::default();
        collect_items(&file.items, source, &index, &mut parsed, true);
        Ok(parsed)
    }
}

fn collect_items(
    items: &[Item],
    source: &str,
    index: &LineIndex,
    parsed: &mut ParsedSource,
    top_level: bool,
) {
    for item in items {
        match item {
            Item::Use(item_use) if top_level => {
                let span = index.range(item_use.span());
                if let Some(text) = source.get(span.clone()) {
                    parsed.imports.push(ImportDecl {
                        text: text.to_string(),
                        span,
                    });
                }
            }
            Item::Const(item_const) if top_level => {
                if let Expr::Lit(expr) = item_const.expr.as_ref() {
                    if let Lit::Str(value) = &expr.lit {
                        parsed
                            .string_constants
                            .push((item_const.ident.to_string(), value.value()));
                    }
                }
            }
            Item::Fn(item_fn) => {
                let sig = &item_fn.sig;
                let brace = &item_fn.block.brace_token.span;
                let body = index.offset(brace.open().start())..index.offset(brace.close().end());
                parsed.functions.push(SyntaxFunction {
                    name: sig.ident.to_string(),
                    params: sig.inputs.iter().map(param_type).collect(),
                    results: result_types(&sig.output),
                    body: Some(body),
                });
            }
            Item::Mod(item_mod) => {
                if let Some((_, nested)) = &item_mod.content {
                    collect_items(nested, source, index, parsed, false);
                }
            }
            _ => {}
        }
    }
}

fn param_type(arg: &FnArg) -> String {
    match arg {
        FnArg::Receiver(_) => "self".to_string(),
        FnArg::Typed(pat) => type_text(&pat.ty),
    }
}

fn result_types(output: &ReturnType) -> Vec<String> {
    let ty = match output {
        ReturnType::Default => return Vec::new(),
        ReturnType::Type(_, ty) => ty.as_ref(),
    };
    if let Type::Path(path) = ty {
        if let Some(last) = path.path.segments.last() {
            if last.ident == "Result" {
                if let PathArguments::AngleBracketed(args) = &last.arguments {
                    let types: Vec<String> = args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            GenericArgument::Type(t) => Some(type_text(t)),
                            _ => None,
                        })
                        .collect();
                    if types.len() == 2 {
                        return types;
                    }
                }
            }
        }
    }
    vec![type_text(ty)]
}

fn type_text(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Converts `proc-macro2` line/column positions into byte offsets.
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex { source, starts }
    }

    /// Line is 1-based, column counts chars.
    fn offset(&self, at: LineColumn) -> usize {
        let Some(&start) = self.starts.get(at.line.saturating_sub(1)) else {
            return self.source.len();
        };
        let rest = &self.source[start..];
        rest.char_indices()
            .nth(at.column)
            .map_or(self.source.len(), |(i, _)| start + i)
    }

    fn range(&self, span: Span) -> Range<usize> {
        self.offset(span.start())..self.offset(span.end())
    }
}
