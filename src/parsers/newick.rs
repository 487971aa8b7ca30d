use crate::TreeParseError;
use std::borrow::Cow;

use super::super::phylo::NodeId;
use super::super::phylo::Tree;

/// Checks if a character is a NEWICK structural delimiter.
fn is_structural_delimiter(character: char) -> bool {
    matches!(character, ';' | '(' | ')' | ',' | ':')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind<'a> {
    Open,
    Close,
    Comma,
    Colon,
    Semicolon,
    Text(&'a str),
    /// Inner text of a single-quoted label, `''` escapes still doubled.
    Quoted(&'a str),
}

impl<'a> TokenKind<'a> {
    fn label(self) -> Option<Cow<'a, str>> {
        match self {
            TokenKind::Text(text) => Some(Cow::Borrowed(text)),
            TokenKind::Quoted(text) if text.contains("''") => {
                Some(Cow::Owned(text.replace("''", "'")))
            }
            TokenKind::Quoted(text) => Some(Cow::Borrowed(text)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    kind: TokenKind<'a>,
    position: usize,
}

impl Token<'_> {
    fn unexpected(&self) -> TreeParseError {
        let token = match self.kind {
            TokenKind::Open => "(",
            TokenKind::Close => ")",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Text(text) | TokenKind::Quoted(text) => text,
        };
        TreeParseError::UnexpectedToken {
            token: token.to_string(),
            position: self.position,
        }
    }
}

/// Splits a NEWICK string on structural delimiters and whitespace.
///
/// Delimiters become their own tokens and whitespace only separates. A
/// `'` at the start of a token opens a quoted label that runs to the next
/// unpaired `'`; inside it `''` stands for one quote and delimiters are
/// plain text. Runs of any other characters become `Text` tokens.
///
/// **Errors:**
/// - `TreeParseError::UnterminatedQuote` - a quoted label is never closed
fn tokenize(s: &str) -> Result<Vec<Token<'_>>, TreeParseError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut text_start: Option<usize> = None;
    let mut chars = s.char_indices().peekable();

    while let Some((position, character)) = chars.next() {
        if character == '\'' && text_start.is_none() {
            let inner_end = loop {
                match chars.next() {
                    Some((end, '\'')) => {
                        if chars.next_if(|&(_, c)| c == '\'').is_none() {
                            break end;
                        }
                    }
                    Some(_) => {}
                    None => return Err(TreeParseError::UnterminatedQuote { position }),
                }
            };
            tokens.push(Token {
                kind: TokenKind::Quoted(&s[position + 1..inner_end]),
                position,
            });
        } else if is_structural_delimiter(character) || character.is_whitespace() {
            if let Some(start) = text_start.take() {
                tokens.push(Token {
                    kind: TokenKind::Text(&s[start..position]),
                    position: start,
                });
            }
            let kind = match character {
                '(' => TokenKind::Open,
                ')' => TokenKind::Close,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semicolon,
                _ => continue,
            };
            tokens.push(Token { kind, position });
        } else if text_start.is_none() {
            text_start = Some(position);
        }
    }

    if let Some(start) = text_start {
        tokens.push(Token { kind: TokenKind::Text(&s[start..]), position: start });
    }

    Ok(tokens)
}

/// Parses a single NEWICK tree into a [Tree].
///
/// Node labels are kept verbatim apart from unquoting; branch lengths are
/// skipped. A trailing `;` is optional and anything after it is ignored.
///
/// **Errors:**
/// - `TreeParseError::Empty` - no tokens in the input
/// - `TreeParseError::UnterminatedQuote` - a quoted label is never closed
/// - `TreeParseError::UnexpectedToken` - a token out of place, e.g. a
///   missing `,` between siblings or an empty child
/// - `TreeParseError::UnexpectedEnd` - unbalanced parentheses
///
/// The parser keeps the chain of open clades on an explicit stack, so
/// nesting depth is limited only by memory.
pub fn parse_newick(s: &str) -> Result<Tree, TreeParseError> {
    let tokens = tokenize(s)?;
    if tokens.is_empty() {
        return Err(TreeParseError::Empty);
    }

    let mut tree = Tree::new();
    let mut open_clades: Vec<NodeId> = Vec::new();
    let mut position: usize = 0;

    'child: loop {
        // Start of a node: either a clade or a tip.
        match tokens.get(position) {
            Some(Token { kind: TokenKind::Open, .. }) => {
                let node_id = tree
                    .add_new_node(<Option<&str>>::None, open_clades.last().copied())?;
                open_clades.push(node_id);
                position += 1;
                continue 'child;
            }
            Some(token) => {
                let Some(label) = token.kind.label() else {
                    return Err(token.unexpected());
                };
                _ = tree.add_new_node(Some(label.as_ref()), open_clades.last().copied())?;
                position = skip_branch_length(&tokens, position + 1);
            }
            None => return Err(TreeParseError::UnexpectedEnd),
        }

        // A node is complete; close as many clades as the input closes.
        loop {
            let Some(&clade_id) = open_clades.last() else {
                return finish(tree, &tokens, position);
            };
            match tokens.get(position) {
                Some(Token { kind: TokenKind::Comma, .. }) => {
                    position += 1;
                    continue 'child;
                }
                Some(Token { kind: TokenKind::Close, .. }) => {
                    _ = open_clades.pop();
                    position += 1;
                    if let Some(label) =
                        tokens.get(position).and_then(|token| token.kind.label())
                    {
                        tree.set_label(&clade_id, Some(label.as_ref()));
                        position += 1;
                    }
                    position = skip_branch_length(&tokens, position);
                }
                Some(token) => return Err(token.unexpected()),
                None => return Err(TreeParseError::UnexpectedEnd),
            }
        }
    }
}

/// Skips `:length` if present at `position`.
fn skip_branch_length(tokens: &[Token], mut position: usize) -> usize {
    if let Some(Token { kind: TokenKind::Colon, .. }) = tokens.get(position) {
        position += 1;
        if let Some(Token { kind: TokenKind::Text(_), .. }) = tokens.get(position)
        {
            position += 1;
        }
    }
    position
}

fn finish(
    mut tree: Tree,
    tokens: &[Token],
    position: usize,
) -> Result<Tree, TreeParseError> {
    match tokens.get(position) {
        None | Some(Token { kind: TokenKind::Semicolon, .. }) => {
            _ = tree.validate()?;
            Ok(tree)
        }
        Some(token) => Err(token.unexpected()),
    }
}

/// Whether `label` has to be single-quoted to read back unchanged.
fn needs_quotes(label: &str) -> bool {
    label.chars().any(|c| {
        c == '\'' || c.is_whitespace() || is_structural_delimiter(c)
    })
}

/// Converts a [Tree] to a NEWICK string with labels and without branch
/// lengths. Labels holding whitespace, quotes or delimiters are written
/// single-quoted, with `'` doubled.
pub fn write_newick(tree: &Tree) -> String {
    enum Step {
        Enter(NodeId),
        Comma,
        Close(NodeId),
    }

    let Some(first_node_id) = tree.first_node_id() else {
        return String::new();
    };

    let push_label = |newick: &mut String, node_id: &NodeId| {
        if let Some(label) = tree.label(node_id) {
            if needs_quotes(&label) {
                newick.push('\'');
                newick.push_str(&label.replace('\'', "''"));
                newick.push('\'');
            } else {
                newick.push_str(&label);
            }
        }
    };

    let mut newick = String::new();
    let mut stack: Vec<Step> = vec![Step::Enter(first_node_id)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(node_id) => {
                let child_ids = tree.child_ids(&node_id);
                if child_ids.is_empty() {
                    push_label(&mut newick, &node_id);
                    continue;
                }
                newick.push('(');
                stack.push(Step::Close(node_id));
                for (i, &child_id) in child_ids.iter().enumerate().rev() {
                    stack.push(Step::Enter(child_id));
                    if i > 0 {
                        stack.push(Step::Comma);
                    }
                }
            }
            Step::Comma => newick.push(','),
            Step::Close(node_id) => {
                newick.push(')');
                push_label(&mut newick, &node_id);
            }
        }
    }
    newick.push(';');
    newick
}
