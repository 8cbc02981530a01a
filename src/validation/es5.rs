//! In-process strategy: parse the asset text as an ES5 script without
//! leaving the build process.
//!
//! oxc parses the full modern grammar, so acceptance is decided in two
//! steps: the source must parse as a script at all, and a visitor pass
//! must find no construct introduced after ES5. Either failure counts as
//! "invalid"; neither is an error for the caller.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrowFunctionExpression, AssignmentExpression, AssignmentTargetPattern, BigIntLiteral,
    BinaryExpression, BindingPattern, CatchClause, ChainExpression, Class, ForOfStatement,
    FormalParameters, Function, ImportExpression, LogicalExpression, NumericLiteral,
    ObjectProperty, PropertyKind, SpreadElement, TaggedTemplateExpression, TemplateLiteral,
    VariableDeclaration, VariableDeclarationKind,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use oxc_syntax::operator::{AssignmentOperator, BinaryOperator, LogicalOperator};
use oxc_syntax::scope::ScopeFlags;
use tracing::debug;

/// A post-ES5 construct found in otherwise parseable source. Only used
/// for diagnostics; the verdict is the boolean.
#[derive(Debug, Clone)]
pub struct Violation {
    pub feature: &'static str,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Es5Parser;

impl Es5Parser {
    pub fn new() -> Self {
        Self
    }

    /// All post-ES5 findings for `content`. Source that does not parse as
    /// a script at all yields a single `syntax error` finding.
    pub fn violations(&self, content: &str) -> Vec<Violation> {
        let allocator = Allocator::default();
        // Script mode: import/export declarations are plain parse errors,
        // which is exactly what ES5 says about them.
        let source_type = SourceType::default().with_module(false);
        let ret = Parser::new(&allocator, content, source_type).parse();

        if ret.panicked || !ret.errors.is_empty() {
            return vec![Violation {
                feature: "syntax error",
                span: Span::new(0, 0),
            }];
        }

        let mut scan = Es5Scan::default();
        scan.visit_program(&ret.program);
        scan.violations
    }

    pub fn is_valid(&self, content: &str) -> bool {
        let violations = self.violations(content);
        for violation in &violations {
            debug!(
                feature = violation.feature,
                offset = violation.span.start,
                "not ES5"
            );
        }
        violations.is_empty()
    }
}

/// Flags every construct the ES5 grammar has no production for. Walking
/// continues past a finding so diagnostics cover the whole file.
#[derive(Default)]
struct Es5Scan {
    violations: Vec<Violation>,
}

impl Es5Scan {
    fn flag(&mut self, feature: &'static str, span: Span) {
        self.violations.push(Violation { feature, span });
    }
}

impl<'a> Visit<'a> for Es5Scan {
    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        self.flag("arrow function", it.span);
        walk::walk_arrow_function_expression(self, it);
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        self.flag("class", it.span);
        walk::walk_class(self, it);
    }

    fn visit_template_literal(&mut self, it: &TemplateLiteral<'a>) {
        self.flag("template literal", it.span);
        walk::walk_template_literal(self, it);
    }

    fn visit_tagged_template_expression(&mut self, it: &TaggedTemplateExpression<'a>) {
        self.flag("tagged template", it.span);
        walk::walk_tagged_template_expression(self, it);
    }

    fn visit_variable_declaration(&mut self, it: &VariableDeclaration<'a>) {
        if it.kind != VariableDeclarationKind::Var {
            self.flag("let/const declaration", it.span);
        }
        walk::walk_variable_declaration(self, it);
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        if it.r#async {
            self.flag("async function", it.span);
        }
        if it.generator {
            self.flag("generator function", it.span);
        }
        walk::walk_function(self, it, flags);
    }

    fn visit_formal_parameters(&mut self, it: &FormalParameters<'a>) {
        // Parameter defaults sit on the parameter itself, not inside its
        // binding pattern.
        for param in &it.items {
            if param.initializer.is_some() {
                self.flag("default parameter", param.span);
            }
        }
        if it.rest.is_some() {
            self.flag("rest parameter", it.span);
        }
        walk::walk_formal_parameters(self, it);
    }

    fn visit_binding_pattern(&mut self, it: &BindingPattern<'a>) {
        match it {
            BindingPattern::ObjectPattern(pattern) => {
                self.flag("destructuring pattern", pattern.span);
            }
            BindingPattern::ArrayPattern(pattern) => {
                self.flag("destructuring pattern", pattern.span);
            }
            BindingPattern::AssignmentPattern(pattern) => {
                self.flag("default value binding", pattern.span);
            }
            _ => {}
        }
        walk::walk_binding_pattern(self, it);
    }

    fn visit_spread_element(&mut self, it: &SpreadElement<'a>) {
        self.flag("spread element", it.span);
        walk::walk_spread_element(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        // Getters and setters are ES5; shorthand, computed keys, and
        // method syntax are not.
        if it.shorthand || it.computed || (it.method && it.kind == PropertyKind::Init) {
            self.flag("ES2015 object property syntax", it.span);
        }
        walk::walk_object_property(self, it);
    }

    fn visit_for_of_statement(&mut self, it: &ForOfStatement<'a>) {
        self.flag("for-of statement", it.span);
        walk::walk_for_of_statement(self, it);
    }

    fn visit_binary_expression(&mut self, it: &BinaryExpression<'a>) {
        if it.operator == BinaryOperator::Exponential {
            self.flag("exponentiation operator", it.span);
        }
        walk::walk_binary_expression(self, it);
    }

    fn visit_assignment_expression(&mut self, it: &AssignmentExpression<'a>) {
        match it.operator {
            AssignmentOperator::Exponential => {
                self.flag("exponentiation assignment", it.span);
            }
            AssignmentOperator::LogicalAnd
            | AssignmentOperator::LogicalOr
            | AssignmentOperator::LogicalNullish => {
                self.flag("logical assignment", it.span);
            }
            _ => {}
        }
        walk::walk_assignment_expression(self, it);
    }

    fn visit_assignment_target_pattern(&mut self, it: &AssignmentTargetPattern<'a>) {
        let span = match it {
            AssignmentTargetPattern::ArrayAssignmentTarget(target) => target.span,
            AssignmentTargetPattern::ObjectAssignmentTarget(target) => target.span,
        };
        self.flag("destructuring assignment", span);
        walk::walk_assignment_target_pattern(self, it);
    }

    fn visit_catch_clause(&mut self, it: &CatchClause<'a>) {
        if it.param.is_none() {
            self.flag("optional catch binding", it.span);
        }
        walk::walk_catch_clause(self, it);
    }

    fn visit_logical_expression(&mut self, it: &LogicalExpression<'a>) {
        if it.operator == LogicalOperator::Coalesce {
            self.flag("nullish coalescing", it.span);
        }
        walk::walk_logical_expression(self, it);
    }

    fn visit_chain_expression(&mut self, it: &ChainExpression<'a>) {
        self.flag("optional chaining", it.span);
        walk::walk_chain_expression(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        self.flag("dynamic import", it.span);
        walk::walk_import_expression(self, it);
    }

    fn visit_big_int_literal(&mut self, it: &BigIntLiteral<'a>) {
        self.flag("bigint literal", it.span);
    }

    fn visit_numeric_literal(&mut self, it: &NumericLiteral<'a>) {
        // Binary/octal prefixes and numeric separators postdate ES5.
        // Legacy octals (0777) are left alone; sloppy-mode ES5 takes them.
        if let Some(raw) = &it.raw {
            let post_es5 = raw.starts_with("0b")
                || raw.starts_with("0B")
                || raw.starts_with("0o")
                || raw.starts_with("0O")
                || raw.contains('_');
            if post_es5 {
                self.flag("ES2015 numeric literal", it.span);
            }
        }
    }
}
