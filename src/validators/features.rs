//! Features and if-feature conditions
//!
//! A [`FeatureExpr`] is the boolean expression of one `if-feature`
//! statement. Enumerations and bits consult a [`FeatureState`] snapshot to
//! decide whether a member is usable; [`FeatureSet`] is the registry that
//! schema tooling toggles between validations.

use crate::error::{Error, Result};
use crate::names::{validate_identifier, PrefixedName};
use crate::namespaces::NamespacePrefixMap;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// A feature, identified by its module and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureRef {
    /// Module defining the feature
    pub module: String,
    /// Feature name
    pub name: String,
}

impl FeatureRef {
    /// Create a feature reference
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FeatureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.name)
    }
}

/// Read access to the enabled status of features
pub trait FeatureState {
    /// Whether the feature is currently enabled
    fn is_enabled(&self, feature: &FeatureRef) -> bool;
}

impl<F> FeatureState for F
where
    F: Fn(&FeatureRef) -> bool,
{
    fn is_enabled(&self, feature: &FeatureRef) -> bool {
        self(feature)
    }
}

/// An if-feature expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureExpr {
    /// A single feature
    Feature(FeatureRef),
    /// Negation
    Not(Box<FeatureExpr>),
    /// Conjunction
    And(Box<FeatureExpr>, Box<FeatureExpr>),
    /// Disjunction
    Or(Box<FeatureExpr>, Box<FeatureExpr>),
}

impl FeatureExpr {
    /// Expression consisting of a single feature
    pub fn feature(module: impl Into<String>, name: impl Into<String>) -> Self {
        FeatureExpr::Feature(FeatureRef::new(module, name))
    }

    /// Parse an if-feature argument
    ///
    /// Unprefixed feature names belong to `module`; prefixed ones are looked
    /// up in the module's `imports`.
    pub fn parse(text: &str, module: &str, imports: &NamespacePrefixMap) -> Result<Self> {
        let mut parser = ExprParser {
            text,
            tokens: tokenize(text),
            pos: 0,
            module,
            imports,
        };
        let expr = parser.parse_or()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(parser.error(&format!("unexpected \"{}\"", token))),
        }
    }

    /// Evaluate with a callback deciding each feature
    pub fn eval_with(&self, is_enabled: &mut dyn FnMut(&FeatureRef) -> bool) -> bool {
        match self {
            FeatureExpr::Feature(feature) => is_enabled(feature),
            FeatureExpr::Not(inner) => !inner.eval_with(is_enabled),
            FeatureExpr::And(lhs, rhs) => lhs.eval_with(is_enabled) && rhs.eval_with(is_enabled),
            FeatureExpr::Or(lhs, rhs) => lhs.eval_with(is_enabled) || rhs.eval_with(is_enabled),
        }
    }

    /// Evaluate against a feature snapshot
    pub fn eval(&self, state: &dyn FeatureState) -> bool {
        self.eval_with(&mut |feature| state.is_enabled(feature))
    }

    /// Features referenced by the expression, left to right
    pub fn features(&self) -> Vec<&FeatureRef> {
        let mut out = Vec::new();
        self.collect_features(&mut out);
        out
    }

    fn collect_features<'a>(&'a self, out: &mut Vec<&'a FeatureRef>) {
        match self {
            FeatureExpr::Feature(feature) => out.push(feature),
            FeatureExpr::Not(inner) => inner.collect_features(out),
            FeatureExpr::And(lhs, rhs) | FeatureExpr::Or(lhs, rhs) => {
                lhs.collect_features(out);
                rhs.collect_features(out);
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent_binds_tighter: bool) -> fmt::Result {
        if parent_binds_tighter && matches!(self, FeatureExpr::Or(..) | FeatureExpr::And(..)) {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for FeatureExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureExpr::Feature(feature) => write!(f, "{}", feature),
            FeatureExpr::Not(inner) => {
                f.write_str("not ")?;
                inner.fmt_operand(f, true)
            }
            FeatureExpr::And(lhs, rhs) => {
                lhs.fmt_operand(f, matches!(**lhs, FeatureExpr::Or(..)))?;
                f.write_str(" and ")?;
                rhs.fmt_operand(f, matches!(**rhs, FeatureExpr::Or(..)))
            }
            FeatureExpr::Or(lhs, rhs) => {
                write!(f, "{} or {}", lhs, rhs)
            }
        }
    }
}

/// Split an expression into parentheses and words
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (idx, c) in text.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' {
            if let Some(begin) = start.take() {
                tokens.push(&text[begin..idx]);
            }
            if c == '(' || c == ')' {
                tokens.push(&text[idx..idx + 1]);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(begin) = start {
        tokens.push(&text[begin..]);
    }

    tokens
}

/// Recursive descent over `or` < `and` < `not`
struct ExprParser<'a> {
    text: &'a str,
    tokens: Vec<&'a str>,
    pos: usize,
    module: &'a str,
    imports: &'a NamespacePrefixMap,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, keyword: &str) -> bool {
        if self.peek() == Some(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> Error {
        Error::Feature(format!(
            "Invalid if-feature expression \"{}\": {}.",
            self.text, reason
        ))
    }

    fn parse_or(&mut self) -> Result<FeatureExpr> {
        let mut lhs = self.parse_and()?;
        while self.eat("or") {
            let rhs = self.parse_and()?;
            lhs = FeatureExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<FeatureExpr> {
        let mut lhs = self.parse_factor()?;
        while self.eat("and") {
            let rhs = self.parse_factor()?;
            lhs = FeatureExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<FeatureExpr> {
        match self.next() {
            Some("not") => Ok(FeatureExpr::Not(Box::new(self.parse_factor()?))),
            Some("(") => {
                let inner = self.parse_or()?;
                if self.eat(")") {
                    Ok(inner)
                } else {
                    Err(self.error("missing \")\""))
                }
            }
            Some(token @ (")" | "and" | "or")) => {
                Err(self.error(&format!("unexpected \"{}\"", token)))
            }
            Some(token) => self.feature(token),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn feature(&self, token: &str) -> Result<FeatureExpr> {
        let name = PrefixedName::parse(token)
            .ok_or_else(|| self.error(&format!("invalid feature name \"{}\"", token)))?;
        let module = match name.prefix {
            Some(prefix) => self
                .imports
                .get_module(prefix)
                .ok_or_else(|| self.error(&format!("unknown prefix \"{}\"", prefix)))?,
            None => self.module,
        };
        Ok(FeatureExpr::feature(module, name.name))
    }
}

#[derive(Debug, Clone)]
struct FeatureEntry {
    enabled: bool,
    if_features: Vec<FeatureExpr>,
}

/// Registry of declared features and their enabled flags
///
/// A feature is effectively enabled when its flag is set and all of its own
/// if-feature conditions hold, recursively. Features start disabled.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    features: IndexMap<FeatureRef, FeatureEntry>,
}

impl FeatureSet {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a feature together with its own if-feature conditions
    pub fn declare(
        &mut self,
        module: &str,
        name: &str,
        if_features: Vec<FeatureExpr>,
    ) -> Result<()> {
        validate_identifier(name)?;
        let feature = FeatureRef::new(module, name);
        if self.features.contains_key(&feature) {
            return Err(Error::Feature(format!(
                "Duplicate feature \"{}\" in module \"{}\".",
                name, module
            )));
        }
        if if_features
            .iter()
            .any(|expr| expr.features().contains(&&feature))
        {
            return Err(Error::Feature(format!(
                "Feature \"{}\" is referenced from itself.",
                name
            )));
        }
        debug!(%feature, conditions = if_features.len(), "declared feature");
        self.features.insert(
            feature,
            FeatureEntry {
                enabled: false,
                if_features,
            },
        );
        Ok(())
    }

    /// Whether the feature is declared
    pub fn contains(&self, feature: &FeatureRef) -> bool {
        self.features.contains_key(feature)
    }

    /// Declared features in declaration order
    pub fn features(&self) -> impl Iterator<Item = &FeatureRef> {
        self.features.keys()
    }

    /// Number of declared features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no feature is declared
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Fail on the first feature whose conditions reach back to itself
    pub fn check_cycles(&self) -> Result<()> {
        for (idx, feature) in self.features.keys().enumerate() {
            if self.depends_on(idx, idx) {
                return Err(Error::Feature(format!(
                    "Feature \"{}\" is indirectly referenced from itself.",
                    feature.name
                )));
            }
        }
        Ok(())
    }

    /// Declared features referenced by the conditions of a feature
    fn dependencies(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.features
            .get_index(idx)
            .into_iter()
            .flat_map(|(_, entry)| entry.if_features.iter())
            .flat_map(|expr| expr.features())
            .filter_map(move |feature| self.features.get_index_of(feature))
    }

    fn depends_on(&self, idx: usize, target: usize) -> bool {
        let mut visited = vec![false; self.features.len()];
        let mut queue: VecDeque<usize> = self.dependencies(idx).collect();

        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            match visited.get_mut(current) {
                Some(seen) if !*seen => *seen = true,
                _ => continue,
            }
            queue.extend(self.dependencies(current));
        }
        false
    }

    /// Enable a feature, or every feature of the module with `"*"`
    ///
    /// A feature whose own conditions are currently false cannot be enabled.
    /// The wildcard is all or nothing: when some feature of the module stays
    /// disabled, no flag is changed.
    pub fn enable(&mut self, module: &str, name: &str) -> Result<()> {
        if name == "*" {
            return self.enable_all(module);
        }

        let feature = FeatureRef::new(module, name);
        let idx = self.index_of(&feature)?;
        let state: &FeatureSet = self;
        let satisfied = state.features[idx]
            .if_features
            .iter()
            .all(|expr| expr.eval(state));
        if !satisfied {
            return Err(Error::Feature(format!(
                "Feature \"{}\" cannot be enabled since it is disabled by its if-feature condition(s).",
                name
            )));
        }

        self.features[idx].enabled = true;
        debug!(%feature, "enabled feature");
        Ok(())
    }

    /// Disable a feature, or every feature of the module with `"*"`
    pub fn disable(&mut self, module: &str, name: &str) -> Result<()> {
        if name == "*" {
            self.disable_all(module);
            return Ok(());
        }

        let feature = FeatureRef::new(module, name);
        let idx = self.index_of(&feature)?;
        self.features[idx].enabled = false;
        debug!(%feature, "disabled feature");
        Ok(())
    }

    fn enable_all(&mut self, module: &str) -> Result<()> {
        let saved: Vec<bool> = self.features.values().map(|entry| entry.enabled).collect();

        // conditions may depend on features enabled in an earlier round
        loop {
            let ready: Vec<usize> = {
                let state: &FeatureSet = self;
                state
                    .features
                    .iter()
                    .enumerate()
                    .filter(|(_, (feature, entry))| {
                        feature.module == module
                            && !entry.enabled
                            && entry.if_features.iter().all(|expr| expr.eval(state))
                    })
                    .map(|(idx, _)| idx)
                    .collect()
            };
            if ready.is_empty() {
                break;
            }
            for idx in ready {
                self.features[idx].enabled = true;
            }
        }

        let blocked = self
            .features
            .keys()
            .find(|feature| feature.module == module && !self.is_enabled(feature))
            .cloned();
        match blocked {
            Some(feature) => {
                for (entry, enabled) in self.features.values_mut().zip(saved) {
                    entry.enabled = enabled;
                }
                debug!(%feature, "refused to enable all features of module");
                Err(Error::Feature(format!(
                    "Feature \"{}\" cannot be enabled since it is disabled by its if-feature condition(s).",
                    feature.name
                )))
            }
            None => {
                debug!(module, "enabled all features of module");
                Ok(())
            }
        }
    }

    fn disable_all(&mut self, module: &str) {
        let mut count = 0;
        for (_, entry) in self.features.iter_mut().filter(|(f, _)| f.module == module) {
            entry.enabled = false;
            count += 1;
        }
        debug!(module, count, "disabled all features of module");
    }

    fn index_of(&self, feature: &FeatureRef) -> Result<usize> {
        self.features.get_index_of(feature).ok_or_else(|| {
            Error::Feature(format!(
                "Feature \"{}\" not found in module \"{}\".",
                feature.name, feature.module
            ))
        })
    }

    /// Enabled flag, ignoring the feature's own conditions
    pub fn is_flagged(&self, feature: &FeatureRef) -> bool {
        self.features.get(feature).is_some_and(|entry| entry.enabled)
    }

    fn effective(&self, idx: usize, visiting: &mut Vec<usize>) -> bool {
        let Some((_, entry)) = self.features.get_index(idx) else {
            return false;
        };
        if !entry.enabled || visiting.contains(&idx) {
            return false;
        }

        visiting.push(idx);
        let result = entry.if_features.iter().all(|expr| {
            expr.eval_with(&mut |feature| match self.features.get_index_of(feature) {
                Some(dep) => self.effective(dep, visiting),
                None => false,
            })
        });
        visiting.pop();
        result
    }
}

impl FeatureState for FeatureSet {
    fn is_enabled(&self, feature: &FeatureRef) -> bool {
        match self.features.get_index_of(feature) {
            Some(idx) => self.effective(idx, &mut Vec::new()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imports() -> NamespacePrefixMap {
        NamespacePrefixMap::new().with_prefix("d", "defs").unwrap()
    }

    #[test]
    fn test_parse_single_feature() {
        let expr = FeatureExpr::parse("f", "types", &imports()).unwrap();
        assert_eq!(expr, FeatureExpr::feature("types", "f"));

        let expr = FeatureExpr::parse("d:g", "types", &imports()).unwrap();
        assert_eq!(expr, FeatureExpr::feature("defs", "g"));
    }

    #[test]
    fn test_parse_precedence() {
        let expr = FeatureExpr::parse("a or b and not c", "m", &imports()).unwrap();
        assert_eq!(
            expr,
            FeatureExpr::Or(
                Box::new(FeatureExpr::feature("m", "a")),
                Box::new(FeatureExpr::And(
                    Box::new(FeatureExpr::feature("m", "b")),
                    Box::new(FeatureExpr::Not(Box::new(FeatureExpr::feature("m", "c")))),
                )),
            )
        );
        assert_eq!(expr.to_string(), "m:a or m:b and not m:c");

        let expr = FeatureExpr::parse("(a or b) and c", "m", &imports()).unwrap();
        assert_eq!(expr.to_string(), "(m:a or m:b) and m:c");
        assert_eq!(expr.features().len(), 3);
    }

    #[test]
    fn test_parse_errors() {
        let imports = imports();
        for text in ["", "a and", "(a or b", "a b", "x:a", "not", ")", "a or or b", "1a"] {
            assert!(
                matches!(FeatureExpr::parse(text, "m", &imports), Err(Error::Feature(_))),
                "expected error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_eval_with_closure() {
        let expr = FeatureExpr::parse("a and not b", "m", &imports()).unwrap();
        let only_a = |feature: &FeatureRef| feature.name == "a";
        assert!(expr.eval(&only_a));

        let all = |_: &FeatureRef| true;
        assert!(!expr.eval(&all));
    }

    #[test]
    fn test_enable_and_disable() {
        let mut set = FeatureSet::new();
        set.declare("types", "f", Vec::new()).unwrap();
        let f = FeatureRef::new("types", "f");

        assert!(!set.is_enabled(&f));
        set.enable("types", "f").unwrap();
        assert!(set.is_enabled(&f));
        set.disable("types", "f").unwrap();
        assert!(!set.is_enabled(&f));
    }

    #[test]
    fn test_unknown_and_duplicate_features() {
        let mut set = FeatureSet::new();
        set.declare("types", "f", Vec::new()).unwrap();
        assert!(set.declare("types", "f", Vec::new()).is_err());
        assert!(matches!(set.enable("types", "g"), Err(Error::Feature(_))));
        assert!(set.disable("defs", "f").is_err());
        assert!(!set.is_enabled(&FeatureRef::new("types", "g")));
    }

    #[test]
    fn test_dependent_feature() {
        let mut set = FeatureSet::new();
        set.declare("m", "base", Vec::new()).unwrap();
        set.declare("m", "dep", vec![FeatureExpr::feature("m", "base")])
            .unwrap();

        let err = set.enable("m", "dep").unwrap_err();
        assert_eq!(
            err.to_string(),
            "feature error: Feature \"dep\" cannot be enabled since it is disabled by its if-feature condition(s)."
        );

        set.enable("m", "base").unwrap();
        set.enable("m", "dep").unwrap();
        assert!(set.is_enabled(&FeatureRef::new("m", "dep")));

        // disabling the dependency switches the dependant off too
        set.disable("m", "base").unwrap();
        assert!(set.is_flagged(&FeatureRef::new("m", "dep")));
        assert!(!set.is_enabled(&FeatureRef::new("m", "dep")));
    }

    #[test]
    fn test_wildcard() {
        let mut set = FeatureSet::new();
        set.declare("m", "a", Vec::new()).unwrap();
        set.declare("m", "b", vec![FeatureExpr::feature("m", "a")]).unwrap();
        set.declare("other", "c", Vec::new()).unwrap();

        set.enable("m", "*").unwrap();
        assert!(set.is_enabled(&FeatureRef::new("m", "a")));
        assert!(set.is_enabled(&FeatureRef::new("m", "b")));
        assert!(!set.is_enabled(&FeatureRef::new("other", "c")));

        set.disable("m", "*").unwrap();
        assert!(!set.is_enabled(&FeatureRef::new("m", "a")));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_self_reference_rejected() {
        let mut set = FeatureSet::new();
        let err = set
            .declare("m", "f1", vec![FeatureExpr::feature("m", "f1")])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "feature error: Feature \"f1\" is referenced from itself."
        );
        assert!(set.is_empty());

        let nested = FeatureExpr::parse("f2 and not f1", "m", &imports()).unwrap();
        assert!(set.declare("m", "f1", vec![nested]).is_err());
    }

    #[test]
    fn test_cycle_detection() {
        let mut set = FeatureSet::new();
        set.declare("m", "f1", vec![FeatureExpr::feature("m", "f2")])
            .unwrap();
        set.declare("m", "f2", vec![FeatureExpr::feature("m", "f1")])
            .unwrap();
        let err = set.check_cycles().unwrap_err();
        assert_eq!(
            err.to_string(),
            "feature error: Feature \"f1\" is indirectly referenced from itself."
        );

        // a shared dependency is not a cycle
        let mut set = FeatureSet::new();
        set.declare("m", "a", Vec::new()).unwrap();
        set.declare("m", "b", vec![FeatureExpr::feature("m", "a")]).unwrap();
        let both = FeatureExpr::parse("a and b", "m", &imports()).unwrap();
        set.declare("m", "c", vec![both]).unwrap();
        assert!(set.check_cycles().is_ok());
    }

    #[test]
    fn test_cyclic_conditions_terminate() {
        let mut set = FeatureSet::new();
        set.declare("m", "a", vec![FeatureExpr::feature("m", "b")]).unwrap();
        set.declare("m", "b", vec![FeatureExpr::feature("m", "a")]).unwrap();
        assert!(set.enable("m", "*").is_err());

        assert!(!set.is_enabled(&FeatureRef::new("m", "a")));
        assert!(!set.is_enabled(&FeatureRef::new("m", "b")));
    }

    /// f1, f2, f3, orfeature {f1 or f2}, andfeature {f1 and f2}, f6 {not f1}
    fn conditional_module() -> FeatureSet {
        let mut set = FeatureSet::new();
        for (name, condition) in [
            ("f1", None),
            ("f2", None),
            ("f3", None),
            ("orfeature", Some("f1 or f2")),
            ("andfeature", Some("f1 and f2")),
            ("f6", Some("not f1")),
        ] {
            let if_features = condition
                .map(|text| vec![FeatureExpr::parse(text, "a", &imports()).unwrap()])
                .unwrap_or_default();
            set.declare("a", name, if_features).unwrap();
        }
        set
    }

    #[test]
    fn test_wildcard_is_all_or_nothing() {
        let mut set = conditional_module();
        set.enable("a", "f1").unwrap();

        let err = set.enable("a", "*").unwrap_err();
        assert_eq!(
            err.to_string(),
            "feature error: Feature \"f6\" cannot be enabled since it is disabled by its if-feature condition(s)."
        );

        // nothing changed
        assert!(set.is_enabled(&FeatureRef::new("a", "f1")));
        for name in ["f2", "f3", "orfeature", "andfeature", "f6"] {
            assert!(!set.is_flagged(&FeatureRef::new("a", name)), "{} flagged", name);
        }
    }

    #[test]
    fn test_wildcard_enables_in_dependency_order() {
        let mut set = FeatureSet::new();
        let both = FeatureExpr::parse("f1 and f2", "a", &imports()).unwrap();
        set.declare("a", "andfeature", vec![both]).unwrap();
        set.declare("a", "f1", Vec::new()).unwrap();
        set.declare("a", "f2", Vec::new()).unwrap();

        set.enable("a", "*").unwrap();
        assert!(set.is_enabled(&FeatureRef::new("a", "andfeature")));
    }
}
