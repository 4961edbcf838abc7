//! Rendering statement lists back to PHP text.
//!
//! Output is regenerated from tokens, so original whitespace and comments
//! are not preserved. The same statements always render to the same text.

use crate::syntax::SyntaxNode;

/// One indentation level.
const INDENT: &str = "    ";

/// Keywords followed by a space before `(`, unlike function calls.
const SPACED_KEYWORDS: &[&str] = &[
    "and", "as", "case", "catch", "clone", "echo", "elseif", "fn", "for", "foreach", "function",
    "if", "include", "include_once", "match", "or", "print", "require", "require_once", "return",
    "switch", "throw", "use", "while", "xor", "yield",
];

/// Keywords that continue the statement closed by the preceding `}`.
const CONTINUATION_KEYWORDS: &[&str] = &["catch", "else", "elseif", "finally"];

/// Declarations whose return-type `:` hugs the closing `)` of the parameters.
const RETURN_TYPE_OWNERS: &[&str] = &[
    "anonymous_function",
    "anonymous_function_creation_expression",
    "arrow_function",
    "function_definition",
    "method_declaration",
];

/// Turns a statement list into source text.
pub trait PrettyPrinter {
    /// Render `statements` as consecutive lines of PHP.
    fn print_statements(&self, statements: &[&SyntaxNode]) -> String;
}

/// Default printer: four-space indentation, one statement per line,
/// braces on the opening line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardPrinter;

impl PrettyPrinter for StandardPrinter {
    fn print_statements(&self, statements: &[&SyntaxNode]) -> String {
        let mut tokens = Vec::new();
        for statement in statements {
            collect_tokens(statement, &mut tokens);
        }

        let mut layout = Layout::default();
        for token in &tokens {
            layout.push(token);
        }
        layout.finish()
    }
}

/// A leaf ready for layout, with the kind of the node that holds it.
struct Token<'a> {
    /// Kind of the node holding this leaf.
    parent: &'static str,
    /// Verbatim leaf text.
    text: &'a str,
}

/// What separates the next token from the previous one.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Gap {
    /// Line break, then the current indentation.
    Newline,
    /// Tokens touch.
    Nothing,
    /// One space.
    Space,
    /// Start of output.
    Start,
}

/// Output under construction plus the state deciding the next gap.
#[derive(Default)]
struct Layout {
    /// One entry per open `{`; `true` once a `case` label inside it has
    /// indented its body.
    blocks: Vec<bool>,
    /// Current indentation level.
    depth: usize,
    /// Text emitted so far.
    out: String,
    /// Parenthesis nesting; `;` inside `for (...)` does not end a line.
    parens: usize,
    /// The previous token ended a line.
    pending_newline: bool,
    /// Previous token text.
    prev: Option<String>,
    /// Kind of the node that held the previous token.
    prev_parent: &'static str,
}

impl Layout {
    /// Emit one token with the gap it needs.
    fn push(&mut self, token: &Token<'_>) {
        let text = token.text;
        let gap = self.gap_before(token);

        match gap {
            Gap::Start | Gap::Nothing => {},
            Gap::Space => self.out.push(' '),
            Gap::Newline => {
                self.out.push('\n');
                for _ in 0..self.depth {
                    self.out.push_str(INDENT);
                }
            },
        }
        self.out.push_str(text);
        self.pending_newline = false;

        match text {
            "(" | "[" => self.parens = self.parens.saturating_add(1),
            ")" | "]" => self.parens = self.parens.saturating_sub(1),
            "{" => {
                self.blocks.push(false);
                self.depth = self.depth.saturating_add(1);
                self.pending_newline = true;
            },
            "}" => self.pending_newline = true,
            ";" if self.parens == 0 => self.pending_newline = true,
            ":" if is_case_label(token.parent) => {
                if let Some(in_case) = self.blocks.last_mut() {
                    *in_case = true;
                }
                self.depth = self.depth.saturating_add(1);
                self.pending_newline = true;
            },
            _ => {},
        }

        self.prev = Some(text.to_string());
        self.prev_parent = token.parent;
    }

    /// Decide the gap before `token`, closing blocks and case bodies it ends.
    fn gap_before(&mut self, token: &Token<'_>) -> Gap {
        let text = token.text;
        let Some(prev) = self.prev.as_deref() else {
            return Gap::Start;
        };

        if text == "}" {
            if self.blocks.pop() == Some(true) {
                self.depth = self.depth.saturating_sub(1);
            }
            self.depth = self.depth.saturating_sub(1);
            if prev == "{" {
                return Gap::Nothing;
            }
            return Gap::Newline;
        }

        if is_case_label(token.parent) && is_case_keyword(text) {
            if let Some(in_case) = self.blocks.last_mut() {
                if *in_case {
                    // Leaving the previous case body.
                    *in_case = false;
                    self.depth = self.depth.saturating_sub(1);
                }
            }
        }

        if self.pending_newline {
            if prev == "}" {
                if matches!(text, ";" | "," | ")" | "]") {
                    return Gap::Nothing;
                }
                if CONTINUATION_KEYWORDS.contains(&text.to_ascii_lowercase().as_str())
                    || (text.eq_ignore_ascii_case("while") && token.parent == "do_statement")
                {
                    return Gap::Space;
                }
            }
            return Gap::Newline;
        }

        if needs_no_space(prev, text, token.parent, self.prev_parent) {
            Gap::Nothing
        } else {
            Gap::Space
        }
    }

    /// The rendered text.
    fn finish(self) -> String {
        self.out
    }
}

/// Leaves of `node` in document order, comments and empty leaves skipped.
fn collect_tokens<'a>(node: &'a SyntaxNode, tokens: &mut Vec<Token<'a>>) {
    let mut stack: Vec<(&'a SyntaxNode, &'static str)> = vec![(node, "")];
    while let Some((node, parent)) = stack.pop() {
        if node.kind() == "comment" {
            continue;
        }
        if let Some(text) = node.leaf_text() {
            // Zero-width automatic semicolons carry no text.
            if !text.is_empty() {
                tokens.push(Token { parent, text });
            }
            continue;
        }
        stack.extend(node.children().iter().rev().map(|child| (child, node.kind())));
    }
}

/// `case` and `default` labels inside a switch.
fn is_case_label(parent: &str) -> bool {
    matches!(parent, "case_statement" | "default_statement")
}

/// The keyword opening a case label.
fn is_case_keyword(text: &str) -> bool {
    text.eq_ignore_ascii_case("case") || text.eq_ignore_ascii_case("default")
}

/// Ends with something a call or subscript can follow.
fn is_word_end(token: &str) -> bool {
    token
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | ')' | ']' | '"' | '\''))
}

/// Tokens that touch their predecessor.
fn needs_no_space(prev: &str, text: &str, parent: &str, prev_parent: &str) -> bool {
    if matches!(prev, "(" | "[" | "->" | "?->" | "::" | "\\" | "..." | "@" | "!" | "$") {
        return true;
    }
    if matches!(text, ")" | "]" | "," | ";" | "->" | "?->" | "::") {
        return true;
    }
    let return_type = prev == ")" && RETURN_TYPE_OWNERS.contains(&parent);
    if text == ":" && (return_type || is_case_label(parent)) {
        return true;
    }
    if text == "(" || text == "[" {
        let keyword = SPACED_KEYWORDS.contains(&prev.to_ascii_lowercase().as_str());
        return is_word_end(prev) && !keyword;
    }
    // A sign before another sign would merge into `--` or `++`.
    if prev_parent == "unary_op_expression" && matches!(prev, "-" | "+" | "~") {
        return prev == "~" || !text.starts_with(prev);
    }
    if matches!(text, "++" | "--") {
        return is_word_end(prev);
    }
    // Prefix increment: nothing can follow a postfix one directly but an operator.
    if matches!(prev, "++" | "--") {
        return text.starts_with('$');
    }
    false
}
