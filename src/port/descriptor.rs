//! @acp:module "Descriptor Scanner"
//! @acp:summary "Line-oriented state machine over generated interface descriptors"
//! @acp:domain cli
//! @acp:layer parser
//!
//! A descriptor (`pkg.generated.mbti`) starts with `package "<name>"` and
//! lists one declaration per line. Struct, enum and trait bodies span several
//! lines and are tracked by [`ScanState`]; [`step`] is a pure transition
//! `(state, line) -> (state', declarations)`.

use std::sync::LazyLock;

use regex::Regex;

use crate::symbol::{SymbolKind, PATH_SEP};

/// `package "Milky2018/moon_rapier/data"`
static PACKAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*package\s+"([^"]+)"\s*$"#).unwrap());

/// Block opener: `pub(all) struct Arena[T] {` or `pub(open) trait Shape : Show {`,
/// optionally with a one-line body
/// Groups: 1=keyword, 2=name, 3=rest after `{`
static BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*pub(?:\([^)]*\))?\s+(struct|enum|trait)\s+([A-Za-z_][A-Za-z0-9_]*)(?:\[[^\]]*\])?(?:\s*:[^{]*)?\s*\{(.*)$",
    )
    .unwrap()
});

/// Block-less type declaration: `pub type Real`, `pub typealias Vec3 = ...`
static TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*pub(?:\([^)]*\))?\s+(struct|enum|trait|typealias|type)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap()
});

/// Free or qualified function; generic annotations are skipped
/// Groups: 1=name or owner, 2=method
static FN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*pub(?:\([^)]*\))?\s+fn(?:\[[^\]]+\])?\s+([A-Za-z_][A-Za-z0-9_]*)(?:::([A-Za-z_][A-Za-z0-9_]*))?",
    )
    .unwrap()
});

/// `pub const NAME : T` or `pub const Owner::NAME : T`
static CONST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*pub(?:\([^)]*\))?\s+const\s+([A-Za-z_][A-Za-z0-9_]*)(?:::([A-Za-z_][A-Za-z0-9_]*))?\b")
        .unwrap()
});

/// `pub using @collision {type ColliderBuilder, trait Shape}`
static USING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*pub\s+using\s+@\S+\s+\{([^}]*)\}\s*$").unwrap());

/// One token of a using list: `type A` or `trait B as C`
static USING_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(type|trait)\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s+as\s+([A-Za-z_][A-Za-z0-9_]*))?")
        .unwrap()
});

/// `#alias(old_name)`
static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#alias\(([A-Za-z_][A-Za-z0-9_]*)\)\s*$").unwrap());

static FIELD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:mut\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*:").unwrap());

static VARIANT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\b").unwrap());

static TRAIT_METHOD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

/// Exact text of a line that ends a block
const BLOCK_CLOSE: &str = "}";

/// @acp:summary "Scanner state, each block state holding its container name"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Outside any block; carries an `#alias` awaiting its declaration
    Top { pending_alias: Option<String> },
    InStruct(String),
    InEnum(String),
    InTrait(String),
}

impl Default for ScanState {
    fn default() -> Self {
        ScanState::Top {
            pending_alias: None,
        }
    }
}

/// @acp:summary "A declaration found in a descriptor, not yet package-qualified"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// `Name` or `Owner::member`
    pub symbol: String,
    pub kind: SymbolKind,
}

impl Declaration {
    fn new(symbol: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
        }
    }

    fn member(owner: &str, name: &str, kind: SymbolKind) -> Self {
        Self::new(format!("{}{}{}", owner, PATH_SEP, name), kind)
    }
}

/// Package name declared by a line, if it is a package line
pub fn package_name(line: &str) -> Option<&str> {
    PACKAGE_PATTERN
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// @acp:summary "Advance the scanner by one line"
pub fn step(state: ScanState, line: &str) -> (ScanState, Vec<Declaration>) {
    match state {
        ScanState::Top { pending_alias } => step_top(pending_alias, line),
        ScanState::InStruct(owner) => step_block(BlockKind::Struct, owner, line),
        ScanState::InEnum(owner) => step_block(BlockKind::Enum, owner, line),
        ScanState::InTrait(owner) => step_block(BlockKind::Trait, owner, line),
    }
}

#[derive(Debug, Clone, Copy)]
enum BlockKind {
    Struct,
    Enum,
    Trait,
}

impl BlockKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "struct" => Some(BlockKind::Struct),
            "enum" => Some(BlockKind::Enum),
            "trait" => Some(BlockKind::Trait),
            _ => None,
        }
    }

    fn container_kind(self) -> SymbolKind {
        match self {
            BlockKind::Struct => SymbolKind::Struct,
            BlockKind::Enum => SymbolKind::Enum,
            BlockKind::Trait => SymbolKind::Trait,
        }
    }

    fn state(self, owner: String) -> ScanState {
        match self {
            BlockKind::Struct => ScanState::InStruct(owner),
            BlockKind::Enum => ScanState::InEnum(owner),
            BlockKind::Trait => ScanState::InTrait(owner),
        }
    }

    /// Member declared by one body line
    fn member(self, owner: &str, line: &str) -> Option<Declaration> {
        let (pattern, kind) = match self {
            BlockKind::Struct => (&*FIELD_PATTERN, SymbolKind::Field),
            BlockKind::Enum => (&*VARIANT_PATTERN, SymbolKind::Variant),
            BlockKind::Trait => (&*TRAIT_METHOD_PATTERN, SymbolKind::TraitMethod),
        };
        let name = pattern.captures(line)?.get(1)?.as_str();
        Some(Declaration::member(owner, name, kind))
    }
}

fn step_block(block: BlockKind, owner: String, line: &str) -> (ScanState, Vec<Declaration>) {
    if line.trim() == BLOCK_CLOSE {
        return (ScanState::default(), Vec::new());
    }
    let found = block.member(&owner, line).into_iter().collect();
    (block.state(owner), found)
}

fn step_top(pending_alias: Option<String>, line: &str) -> (ScanState, Vec<Declaration>) {
    if let Some(caps) = ALIAS_PATTERN.captures(line) {
        let state = ScanState::Top {
            pending_alias: Some(caps[1].to_string()),
        };
        return (state, Vec::new());
    }

    // An alias applies only to the line right after it.
    let alias = pending_alias.as_deref();

    if let Some(caps) = BLOCK_PATTERN.captures(line) {
        if let Some(block) = BlockKind::from_keyword(&caps[1]) {
            let owner = alias.unwrap_or(&caps[2]).to_string();
            let mut found = vec![Declaration::new(owner.clone(), block.container_kind())];
            let rest = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            return match one_line_body(rest) {
                Some(body) => {
                    found.extend(
                        split_members(body)
                            .into_iter()
                            .filter_map(|segment| block.member(&owner, segment)),
                    );
                    (ScanState::default(), found)
                }
                None => (block.state(owner), found),
            };
        }
    }

    let found = top_level(line, alias);
    if found.is_empty() {
        tracing::trace!("unrecognized descriptor line: {}", line.trim());
    }
    (ScanState::default(), found)
}

fn top_level(line: &str, alias: Option<&str>) -> Vec<Declaration> {
    if let Some(caps) = USING_PATTERN.captures(line) {
        return USING_TOKEN_PATTERN
            .captures_iter(&caps[1])
            .filter_map(|token| {
                let kind = token[1].parse::<SymbolKind>().ok()?;
                let name = token.get(3).or_else(|| token.get(2))?.as_str();
                Some(Declaration::new(name, kind))
            })
            .collect();
    }

    if let Some(caps) = CONST_PATTERN.captures(line) {
        let decl = match caps.get(2) {
            Some(name) => {
                Declaration::member(&caps[1], alias.unwrap_or(name.as_str()), SymbolKind::AssocConst)
            }
            None => Declaration::new(alias.unwrap_or(&caps[1]), SymbolKind::Const),
        };
        return vec![decl];
    }

    if let Some(caps) = TYPE_PATTERN.captures(line) {
        if let Ok(kind) = caps[1].parse::<SymbolKind>() {
            return vec![Declaration::new(alias.unwrap_or(&caps[2]), kind)];
        }
    }

    if let Some(caps) = FN_PATTERN.captures(line) {
        let decl = match caps.get(2) {
            Some(method) => {
                Declaration::member(&caps[1], alias.unwrap_or(method.as_str()), SymbolKind::Method)
            }
            None => Declaration::new(alias.unwrap_or(&caps[1]), SymbolKind::Function),
        };
        return vec![decl];
    }

    Vec::new()
}

/// Body of `{ ... }` when the block closes on the opening line
fn one_line_body(rest: &str) -> Option<&str> {
    rest.trim_end().strip_suffix(BLOCK_CLOSE)
}

/// Split a one-line body on `,`/`;` outside brackets and parentheses
fn split_members(body: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth -= 1,
            ',' | ';' if depth == 0 => {
                segments.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&body[start..]);
    segments.into_iter().filter(|s| !s.trim().is_empty()).collect()
}

/// @acp:summary "Scan a whole descriptor text"
/// Returns the declared package and its declarations in file order;
/// `None` when the text has no package line.
pub fn scan_descriptor(content: &str) -> Option<(String, Vec<Declaration>)> {
    let mut lines = content.lines();
    let package = lines.by_ref().find_map(package_name)?.to_string();

    let mut state = ScanState::default();
    let mut declarations = Vec::new();
    for line in lines {
        let (next, found) = step(state, line);
        state = next;
        declarations.extend(found);
    }
    Some((package, declarations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decls(content: &str) -> Vec<(String, SymbolKind)> {
        scan_descriptor(content)
            .unwrap()
            .1
            .into_iter()
            .map(|d| (d.symbol, d.kind))
            .collect()
    }

    fn d(symbol: &str, kind: SymbolKind) -> (String, SymbolKind) {
        (symbol.to_string(), kind)
    }

    #[test]
    fn test_package_line_required() {
        assert!(scan_descriptor("pub fn foo(Int) -> Int\n").is_none());
        let (pkg, found) = scan_descriptor("// header\npackage \"a/b\"\n").unwrap();
        assert_eq!(pkg, "a/b");
        assert!(found.is_empty());
    }

    #[test]
    fn test_generic_struct_and_method() {
        let found = decls(
            "package \"p\"\npub struct Arena[T] {\n  items : Array[Int]\n}\npub fn[T] Arena::capacity(Self[T]) -> Int\n",
        );
        assert_eq!(
            found,
            vec![
                d("Arena", SymbolKind::Struct),
                d("Arena::items", SymbolKind::Field),
                d("Arena::capacity", SymbolKind::Method),
            ]
        );
    }

    #[test]
    fn test_one_line_block_body() {
        let found = decls("package \"p\"\npub struct Arena[T] { items: Array[Int]; mut len: Int }\npub fn f() -> Unit\n");
        assert_eq!(
            found,
            vec![
                d("Arena", SymbolKind::Struct),
                d("Arena::items", SymbolKind::Field),
                d("Arena::len", SymbolKind::Field),
                d("f", SymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_trait_block_requires_exact_close() {
        let found = decls(
            "package \"p\"\npub(open) trait Hooks {\n  filter(Self, (Int) -> Bool) -> Map[Int, Int]}\n  modify(Self) -> Unit\n}\npub fn after() -> Unit\n",
        );
        assert_eq!(
            found,
            vec![
                d("Hooks", SymbolKind::Trait),
                d("Hooks::filter", SymbolKind::TraitMethod),
                d("Hooks::modify", SymbolKind::TraitMethod),
                d("after", SymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_trait_with_supertraits_opens_block() {
        let found = decls(
            "package \"p\"\npub(open) trait Shape : Show + Eq {\n  area(Self) -> Double\n}\npub fn after() -> Unit\n",
        );
        assert_eq!(
            found,
            vec![
                d("Shape", SymbolKind::Trait),
                d("Shape::area", SymbolKind::TraitMethod),
                d("after", SymbolKind::Function),
            ]
        );
        let (state, _) = step(ScanState::default(), "pub(open) trait Shape : Show {");
        assert_eq!(state, ScanState::InTrait("Shape".to_string()));
    }

    #[test]
    fn test_enum_variants() {
        let found = decls("package \"p\"\npub(all) enum BodyType {\n  Dynamic\n  Fixed(Int, String)\n}\n");
        assert_eq!(
            found,
            vec![
                d("BodyType", SymbolKind::Enum),
                d("BodyType::Dynamic", SymbolKind::Variant),
                d("BodyType::Fixed", SymbolKind::Variant),
            ]
        );
    }

    #[test]
    fn test_consts_and_using() {
        let found = decls(
            "package \"p\"\npub const ActiveEvents::COLLISION_EVENTS : Int\npub const MAX : Int = 4\npub using @collision {type ColliderBuilder, trait Shape, type Ball as BallShape}\n",
        );
        assert_eq!(
            found,
            vec![
                d("ActiveEvents::COLLISION_EVENTS", SymbolKind::AssocConst),
                d("MAX", SymbolKind::Const),
                d("ColliderBuilder", SymbolKind::Type),
                d("Shape", SymbolKind::Trait),
                d("BallShape", SymbolKind::Type),
            ]
        );
    }

    #[test]
    fn test_alias_renames_next_declaration_only() {
        let found = decls(
            "package \"p\"\n#alias(linvel)\npub fn RigidBody::linear_velocity(Self) -> Vec\npub fn RigidBody::angvel(Self) -> Vec\n#alias(old)\n\npub fn fresh() -> Unit\n",
        );
        assert_eq!(
            found,
            vec![
                d("RigidBody::linvel", SymbolKind::Method),
                d("RigidBody::angvel", SymbolKind::Method),
                d("fresh", SymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_type_declarations() {
        let found = decls("package \"p\"\npub type Real\npub typealias Vec3 = @math.Vec3\ntype Hidden\npub impl Show for Real\n");
        assert_eq!(
            found,
            vec![d("Real", SymbolKind::Type), d("Vec3", SymbolKind::Type)]
        );
    }

    #[test]
    fn test_step_is_pure() {
        let state = ScanState::InTrait("T".to_string());
        let (a, found_a) = step(state.clone(), "  run(Self) -> Unit");
        let (b, found_b) = step(state, "  run(Self) -> Unit");
        assert_eq!(a, b);
        assert_eq!(found_a, found_b);
        assert_eq!(a, ScanState::InTrait("T".to_string()));

        let (closed, found) = step(a, "  }  ");
        assert_eq!(closed, ScanState::default());
        assert!(found.is_empty());
    }

    #[test]
    fn test_split_members_respects_brackets() {
        assert_eq!(
            split_members(" a: Map[K, V], b: Int "),
            vec![" a: Map[K, V]", " b: Int "]
        );
    }
}
