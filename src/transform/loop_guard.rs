//! Loop guard injection.
//!
//! Every loop in the compiled unit gets a budget check as the first
//! statement of its body:
//!
//! ```text
//! while (x) { f(); }
//!   =>
//! { var __loopGuard0 = 0; while (x) { if (++__loopGuard0 > 100) { break; } f(); } }
//! ```
//!
//! The counter lives in a block wrapped around the loop, so it resets each
//! time the loop statement starts again. Labels stay attached to their loop:
//! the wrapping block goes around the whole labeled statement.
//!
//! Edits are spliced into the source text at AST span offsets rather than
//! built as AST nodes, so the rest of the code is emitted byte for byte.

use oxc::allocator::Allocator;
use oxc::ast::ast::Statement;
use oxc::ast_visit::{Visit, walk};
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType, Span};
use rustc_hash::FxHashSet;

use crate::config::{GuardMode, LoopGuardConfig};

/// Prefix of the injected counter variables.
const GUARD_PREFIX: &str = "__loopGuard";

#[derive(Debug, Clone)]
pub struct LoopGuard {
    mode: GuardMode,
    limit: u32,
}

impl LoopGuard {
    /// Build a guard from config, `None` when disabled.
    pub fn from_config(config: &LoopGuardConfig) -> Option<Self> {
        config.enable.then(|| Self::new(config.mode, config.limit))
    }

    pub const fn new(mode: GuardMode, limit: u32) -> Self {
        Self { mode, limit }
    }

    /// Inject guards into every loop of `source`.
    ///
    /// Returns the parser diagnostics when `source` does not parse.
    pub fn apply(&self, source: &str, source_type: SourceType) -> Result<String, Vec<String>> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, source_type).parse();
        if !ret.errors.is_empty() {
            return Err(ret.errors.iter().map(ToString::to_string).collect());
        }

        let mut collector = LoopCollector::default();
        collector.visit_program(&ret.program);
        if collector.sites.is_empty() {
            return Ok(source.to_string());
        }

        Ok(splice(source, self.insertions(&collector.sites)))
    }

    fn init(&self) -> &'static str {
        match self.mode {
            GuardMode::Iterations => "0",
            GuardMode::Millis => "Date.now()",
        }
    }

    fn check(&self, var: &str) -> String {
        match self.mode {
            GuardMode::Iterations => format!("if (++{var} > {}) {{ break; }}", self.limit),
            GuardMode::Millis => format!("if (Date.now() - {var} > {}) {{ break; }}", self.limit),
        }
    }

    fn insertions(&self, sites: &[LoopSite]) -> Vec<Insertion> {
        let mut out = Vec::with_capacity(sites.len() * 4);
        for (index, site) in sites.iter().enumerate() {
            let var = format!("{GUARD_PREFIX}{index}");
            let check = self.check(&var);
            // Wrapper pieces rank outside body pieces of the same loop
            let wrap = i64::from(site.depth) * 2;
            let body = wrap + 1;

            out.push(Insertion::open(
                site.outer.start,
                wrap,
                format!("{{ var {var} = {}; ", self.init()),
            ));
            if site.block {
                out.push(Insertion::open(site.body.start + 1, body, format!(" {check}")));
            } else {
                out.push(Insertion::open(site.body.start, body, format!("{{ {check} ")));
                out.push(Insertion::close(site.body.end, body, " }"));
            }
            out.push(Insertion::close(site.outer.end, wrap, " }"));
        }
        out
    }
}

// ============================================================================
// Loop Collection
// ============================================================================

/// One guarded loop.
#[derive(Debug)]
struct LoopSite {
    /// Loop statement including any labels in front of it.
    outer: Span,
    body: Span,
    /// Body is a block statement, so the check goes right after `{`.
    block: bool,
    /// Number of enclosing guarded loops.
    depth: u32,
}

#[derive(Default)]
struct LoopCollector {
    sites: Vec<LoopSite>,
    /// Start offsets of loops already recorded through their labels.
    claimed: FxHashSet<u32>,
    depth: u32,
}

impl<'a> Visit<'a> for LoopCollector {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        let mut inner = stmt;
        while let Statement::LabeledStatement(labeled) = inner {
            inner = &labeled.body;
        }

        if let Some(body) = loop_body(inner)
            && self.claimed.insert(inner.span().start)
        {
            self.sites.push(LoopSite {
                outer: stmt.span(),
                body: body.span(),
                block: matches!(body, Statement::BlockStatement(_)),
                depth: self.depth,
            });
            self.depth += 1;
            walk::walk_statement(self, stmt);
            self.depth -= 1;
            return;
        }

        walk::walk_statement(self, stmt);
    }
}

fn loop_body<'s, 'a>(stmt: &'s Statement<'a>) -> Option<&'s Statement<'a>> {
    match stmt {
        Statement::ForStatement(it) => Some(&it.body),
        Statement::ForInStatement(it) => Some(&it.body),
        Statement::ForOfStatement(it) => Some(&it.body),
        Statement::WhileStatement(it) => Some(&it.body),
        Statement::DoWhileStatement(it) => Some(&it.body),
        _ => None,
    }
}

// ============================================================================
// Splicing
// ============================================================================

#[derive(Debug)]
struct Insertion {
    pos: u32,
    /// Order among insertions at the same offset: closings first, innermost
    /// closing first, outermost opening first.
    rank: (u8, i64),
    text: String,
}

impl Insertion {
    fn open(pos: u32, depth: i64, text: impl Into<String>) -> Self {
        Self {
            pos,
            rank: (1, depth),
            text: text.into(),
        }
    }

    fn close(pos: u32, depth: i64, text: impl Into<String>) -> Self {
        Self {
            pos,
            rank: (0, -depth),
            text: text.into(),
        }
    }
}

fn splice(source: &str, mut insertions: Vec<Insertion>) -> String {
    insertions.sort_by_key(|ins| (ins.pos, ins.rank));

    let extra: usize = insertions.iter().map(|ins| ins.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0;
    for ins in &insertions {
        let pos = ins.pos as usize;
        out.push_str(&source[cursor..pos]);
        out.push_str(&ins.text);
        cursor = pos;
    }
    out.push_str(&source[cursor..]);
    out
}
