// ABOUTME: Tokenizer, recursive-descent parser, and parse-time macro expansion

use crate::env::Environment;
use crate::error::{ParseError, Position};
use crate::value::{new_symbol, Value};
use std::collections::HashMap;
use std::rc::Rc;
use std::str::CharIndices;

// ============================================================================
// Cursor — byte-indexed character scanner with line/column tracking
// ============================================================================

struct Cursor<'src> {
    source: &'src str,
    chars: std::iter::Peekable<CharIndices<'src>>,
    line: u32,
    column: u32,
}

impl<'src> Cursor<'src> {
    fn new(source: &'src str) -> Self {
        Cursor {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_at(&self, offset_from_next: usize) -> Option<char> {
        self.chars.clone().nth(offset_from_next).map(|(_, c)| c)
    }

    fn byte_pos(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.source.len())
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

// ============================================================================
// Parse-time macro table
// ============================================================================

#[derive(Clone)]
struct MacroDef {
    params: Vec<Box<str>>,
    variadic: Option<Box<str>>,
    body: Vec<Value>,
}

#[derive(Default)]
struct MacroTable(HashMap<String, MacroDef>);

// ============================================================================
// Public entry points
// ============================================================================

/// Parses every top-level form in `text`. `root_env`, if given, lets the
/// parser pre-attach a Variable to any Symbol whose name is already bound
/// there (spec.md §4.1), so the evaluator can skip an Environment walk for
/// references to predefined bindings.
pub fn parse_all(
    text: &str,
    root_env: Option<&Rc<Environment>>,
) -> Result<Vec<Value>, ParseError> {
    let mut cursor = Cursor::new(text);
    let mut macros = MacroTable::default();
    let mut forms = Vec::new();

    loop {
        skip_ws_and_comments(&mut cursor)?;
        if cursor.peek().is_none() {
            break;
        }
        if let Some(c) = cursor.peek() {
            if matches!(c, ')' | ']' | '}') {
                let at = cursor.position();
                return Err(ParseError::UnexpectedDelimiter { delimiter: c, at });
            }
        }
        let form = parse_expr(&mut cursor, root_env)?;
        let expanded = finish_form(form, &mut macros, root_env, cursor.position())?;
        forms.extend(expanded);
    }

    Ok(forms)
}

/// Parses exactly one top-level form, ignoring anything after it.
pub fn parse_one(text: &str, root_env: Option<&Rc<Environment>>) -> Result<Value, ParseError> {
    let mut cursor = Cursor::new(text);
    let mut macros = MacroTable::default();
    skip_ws_and_comments(&mut cursor)?;
    let form = parse_expr(&mut cursor, root_env)?;
    let mut expanded = finish_form(form, &mut macros, root_env, cursor.position())?;
    match expanded.len() {
        0 => Ok(Value::array(vec![])),
        1 => Ok(expanded.remove(0)),
        _ => Ok(Value::array(expanded)),
    }
}

// ============================================================================
// Whitespace / comments
// ============================================================================

fn skip_ws_and_comments(cursor: &mut Cursor) -> Result<(), ParseError> {
    loop {
        match cursor.peek() {
            Some(c) if c.is_whitespace() => {
                cursor.bump();
            }
            Some('#') => {
                while let Some(c) = cursor.peek() {
                    if c == '\n' {
                        break;
                    }
                    cursor.bump();
                }
            }
            _ => break,
        }
    }
    Ok(())
}

// ============================================================================
// Expression parsing
// ============================================================================

fn parse_expr(cursor: &mut Cursor, root_env: Option<&Rc<Environment>>) -> Result<Value, ParseError> {
    skip_ws_and_comments(cursor)?;
    let at = cursor.position();
    match cursor.peek() {
        None => Err(ParseError::UnexpectedEof { at }),
        Some('\'') => {
            cursor.bump();
            let quoted = parse_expr(cursor, root_env)?;
            Ok(Value::array(vec![make_symbol("quote", root_env), quoted]))
        }
        Some('(') => parse_list(cursor, '(', ')', None, root_env),
        Some('[') => parse_list(cursor, '[', ']', Some("array"), root_env),
        Some('{') => parse_list(cursor, '{', '}', Some("hash"), root_env),
        Some(')') | Some(']') | Some('}') => {
            let c = cursor.peek().unwrap();
            Err(ParseError::UnexpectedDelimiter { delimiter: c, at })
        }
        Some('"') => parse_string(cursor),
        Some(c) if c.is_ascii_digit() => parse_number(cursor),
        Some(c) if c == '.' && cursor.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
            parse_number(cursor)
        }
        Some(c) if is_identifier_start(c) => parse_identifier(cursor, root_env),
        Some(c) => Err(ParseError::UnknownToken {
            token: c.to_string(),
            at,
        }),
    }
}

/// Reparses `-<rest>` as a negative numeric literal when `rest` is itself a
/// valid number, the mechanism spec.md §4.1 uses for unary minus on a
/// literal. Falls back to a plain `-foo` symbol otherwise.
fn parse_identifier(cursor: &mut Cursor, root_env: Option<&Rc<Environment>>) -> Result<Value, ParseError> {
    let start = cursor.byte_pos();
    let at = cursor.position();
    cursor.bump(); // first char, already validated by caller
    while let Some(c) = cursor.peek() {
        if is_identifier_continue(c) {
            cursor.bump();
        } else {
            break;
        }
    }
    let end = cursor.byte_pos();
    let text = &cursor.source[start..end];

    if let Some(rest) = text.strip_prefix('-') {
        if !rest.is_empty() && rest.chars().next().unwrap().is_ascii_digit() {
            let mut sub = Cursor::new(rest);
            if let Ok(num) = parse_number(&mut sub) {
                if sub.peek().is_none() {
                    return Ok(negate(num));
                }
            }
        }
    }

    let _ = at;
    Ok(make_symbol(text, root_env))
}

fn negate(value: Value) -> Value {
    match value {
        Value::Int(n) => Value::Int(-n),
        Value::Double(n) => Value::Double(-n),
        other => other,
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || "=_+-*/%!&<>.".contains(c)
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit() || c == '?'
}

fn make_symbol(name: &str, root_env: Option<&Rc<Environment>>) -> Value {
    let symbol = new_symbol(name);
    if let Some(env) = root_env {
        if let Some(var) = env.lookup(name) {
            *symbol.attached.borrow_mut() = Some(var);
        }
    }
    Value::Symbol(symbol)
}

fn parse_number(cursor: &mut Cursor) -> Result<Value, ParseError> {
    let start = cursor.byte_pos();
    let at = cursor.position();
    let mut is_float = false;

    while cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
        cursor.bump();
    }

    if cursor.peek() == Some('.') {
        let after_dot = cursor.peek_at(1);
        if after_dot.is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            cursor.bump(); // '.'
            while cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                cursor.bump();
            }
            if cursor.peek() == Some('.') {
                return Err(ParseError::NonDecimalFloat { at });
            }
        } else if after_dot.is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(ParseError::MalformedFloat { at });
        }
    }

    let end = cursor.byte_pos();
    let text = &cursor.source[start..end];

    if cursor.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(ParseError::NonDigitInNumber { at });
    }

    if is_float {
        text.parse::<f64>()
            .map(Value::Double)
            .map_err(|_| ParseError::MalformedFloat { at })
    } else {
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ParseError::MalformedFloat { at })
    }
}

fn parse_string(cursor: &mut Cursor) -> Result<Value, ParseError> {
    let at = cursor.position();
    cursor.bump(); // opening quote
    let mut out = String::new();
    loop {
        match cursor.bump() {
            None => return Err(ParseError::UnexpectedEofInString { at }),
            Some('"') => break,
            Some('\\') => match cursor.bump() {
                None => return Err(ParseError::UnexpectedEofInString { at }),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
            },
            Some(c) => out.push(c),
        }
    }
    Ok(Value::str(out))
}

fn closing_for(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => unreachable!("not an opening delimiter: {opener}"),
    }
}

fn is_closing_delim(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

fn parse_list(
    cursor: &mut Cursor,
    opener: char,
    closer: char,
    pre_symbol: Option<&str>,
    root_env: Option<&Rc<Environment>>,
) -> Result<Value, ParseError> {
    let opened_at = cursor.position();
    cursor.bump(); // opening delimiter

    let mut items = Vec::new();
    if let Some(name) = pre_symbol {
        items.push(make_symbol(name, root_env));
    }

    loop {
        skip_ws_and_comments(cursor)?;
        match cursor.peek() {
            None => {
                return Err(ParseError::UnexpectedEofInArray { opener, opened_at });
            }
            Some(c) if is_closing_delim(c) => {
                if c == closer {
                    cursor.bump();
                    break;
                } else {
                    let at = cursor.position();
                    cursor.bump();
                    return Err(ParseError::MismatchedDelimiter {
                        opener,
                        opened_at,
                        closer: c,
                        at,
                    });
                }
            }
            _ => {
                // The child form handles its own nested close-delimiter
                // mismatches; only the unmatched-closer case above needs it.
                let _ = closing_for(opener);
                let form = parse_expr(cursor, root_env)?;
                items.push(form);
            }
        }
    }

    Ok(Value::array(items))
}

// ============================================================================
// Parse-time macro expansion
// ============================================================================

/// Inspects a freshly-parsed form: registers it if it is a macro
/// definition, expands it if it is a call to a known macro, or returns it
/// unchanged otherwise. Runs once per form, at the point its immediate
/// parent (a list being parsed, or the top-level driver) is about to append
/// it — matching spec.md's "after each complete form ... is constructed,
/// before it is appended to its enclosing Array".
fn finish_form(
    form: Value,
    macros: &mut MacroTable,
    root_env: Option<&Rc<Environment>>,
    at: Position,
) -> Result<Vec<Value>, ParseError> {
    let head_name = match &form {
        Value::Array(items) => items
            .borrow()
            .first()
            .and_then(|v| match v {
                Value::Symbol(s) => Some(s.name.to_string()),
                _ => None,
            }),
        _ => None,
    };

    match head_name.as_deref() {
        Some("macro") => {
            register_macro(&form, macros, at)?;
            Ok(vec![Value::array(vec![])])
        }
        Some(name) if macros.0.contains_key(name) => {
            let def = macros.0.get(name).unwrap().clone();
            let args = match &form {
                Value::Array(items) => items.borrow()[1..].to_vec(),
                _ => unreachable!(),
            };
            let expanded = expand_macro_call(name, &def, &args, at)?;
            let mut out = Vec::with_capacity(expanded.len());
            for value in expanded {
                out.extend(finish_form(value, macros, root_env, at)?);
            }
            Ok(out)
        }
        _ => Ok(vec![form]),
    }
}

fn register_macro(form: &Value, macros: &mut MacroTable, at: Position) -> Result<(), ParseError> {
    let items = match form {
        Value::Array(items) => items.borrow().clone(),
        _ => unreachable!(),
    };
    if items.len() < 3 {
        return Err(ParseError::MacroMalformed {
            reason: "expected (macro NAME (PARAMS...) BODY...)".to_string(),
            at,
        });
    }
    let name = match &items[1] {
        Value::Symbol(s) => s.name.to_string(),
        _ => {
            return Err(ParseError::MacroMalformed {
                reason: "macro name must be a symbol".to_string(),
                at,
            })
        }
    };
    let (params, variadic) = parse_param_list(&items[2], at)?;
    let body = items[3..].to_vec();
    macros.0.insert(
        name,
        MacroDef {
            params,
            variadic,
            body,
        },
    );
    Ok(())
}

fn parse_param_list(
    value: &Value,
    at: Position,
) -> Result<(Vec<Box<str>>, Option<Box<str>>), ParseError> {
    let items = match value {
        Value::Array(items) => items.borrow().clone(),
        _ => {
            return Err(ParseError::MacroMalformed {
                reason: "parameter list must be an array".to_string(),
                at,
            })
        }
    };
    let mut params = Vec::new();
    let mut variadic = None;
    let mut i = 0;
    while i < items.len() {
        match &items[i] {
            Value::Symbol(s) if &*s.name == "&" => {
                let rest = items.get(i + 1).ok_or_else(|| ParseError::MacroMalformed {
                    reason: "'&' must be followed by a rest parameter name".to_string(),
                    at,
                })?;
                match rest {
                    Value::Symbol(s) => variadic = Some(s.name.clone()),
                    _ => {
                        return Err(ParseError::MacroMalformed {
                            reason: "rest parameter must be a symbol".to_string(),
                            at,
                        })
                    }
                }
                break;
            }
            Value::Symbol(s) => params.push(s.name.clone()),
            _ => {
                return Err(ParseError::MacroMalformed {
                    reason: "parameter must be a symbol".to_string(),
                    at,
                })
            }
        }
        i += 1;
    }
    Ok((params, variadic))
}

fn expand_macro_call(
    name: &str,
    def: &MacroDef,
    args: &[Value],
    at: Position,
) -> Result<Vec<Value>, ParseError> {
    match &def.variadic {
        None if args.len() != def.params.len() => {
            return Err(ParseError::MacroArgumentMismatch {
                name: name.to_string(),
                expected: def.params.len().to_string(),
                actual: args.len(),
                at,
            });
        }
        Some(_) if args.len() < def.params.len() => {
            return Err(ParseError::MacroArgumentMismatch {
                name: name.to_string(),
                expected: format!("at least {}", def.params.len()),
                actual: args.len(),
                at,
            });
        }
        _ => {}
    }

    let mut bindings: HashMap<String, Value> = HashMap::new();
    for (param, arg) in def.params.iter().zip(args.iter()) {
        bindings.insert(param.to_string(), arg.clone());
    }
    let variadic_binding = def
        .variadic
        .as_ref()
        .map(|name| (name.to_string(), args[def.params.len()..].to_vec()));

    Ok(substitute_seq(&def.body, &bindings, &variadic_binding))
}

fn substitute_seq(
    items: &[Value],
    bindings: &HashMap<String, Value>,
    variadic: &Option<(String, Vec<Value>)>,
) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Symbol(sym) => {
                if let Some((vname, values)) = variadic {
                    if &*sym.name == vname.as_str() {
                        out.extend(values.iter().cloned());
                        continue;
                    }
                }
                match bindings.get(sym.name.as_ref()) {
                    Some(value) => out.push(value.clone()),
                    None => out.push(item.clone()),
                }
            }
            Value::Array(arr) => {
                let inner = substitute_seq(&arr.borrow(), bindings, variadic);
                out.push(Value::array(inner));
            }
            other => out.push(other.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Value {
        parse_one(text, None).unwrap()
    }

    #[test]
    fn parses_integers_and_doubles() {
        assert_eq!(parse("42"), Value::Int(42));
        assert_eq!(parse("3.5"), Value::Double(3.5));
        assert_eq!(parse("-7"), Value::Int(-7));
        assert_eq!(parse("-2.5"), Value::Double(-2.5));
    }

    #[test]
    fn parses_strings_with_escapes() {
        assert_eq!(parse(r#""a\nb""#), Value::str("a\nb"));
    }

    #[test]
    fn parses_symbols() {
        match parse("foo-bar?") {
            Value::Symbol(s) => assert_eq!(&*s.name, "foo-bar?"),
            other => panic!("expected symbol, got {other:?}"),
        }
    }

    #[test]
    fn bracket_literal_gets_array_head() {
        match parse("[1 2 3]") {
            Value::Array(items) => {
                let items = items.borrow();
                assert_eq!(items.len(), 4);
                match &items[0] {
                    Value::Symbol(s) => assert_eq!(&*s.name, "array"),
                    _ => panic!("expected array symbol"),
                }
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn brace_literal_gets_hash_head() {
        match parse(r#"{"a" 1}"#) {
            Value::Array(items) => {
                let items = items.borrow();
                match &items[0] {
                    Value::Symbol(s) => assert_eq!(&*s.name, "hash"),
                    _ => panic!("expected hash symbol"),
                }
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn quote_sugar_desugars() {
        match parse("'x") {
            Value::Array(items) => {
                let items = items.borrow();
                assert_eq!(items.len(), 2);
                match &items[0] {
                    Value::Symbol(s) => assert_eq!(&*s.name, "quote"),
                    _ => panic!("expected quote symbol"),
                }
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_array_is_unexpected_eof_in_array() {
        let err = parse_one("(+ 1 2", None).unwrap_err();
        match err {
            ParseError::UnexpectedEofInArray { opener, opened_at } => {
                assert_eq!(opener, '(');
                assert_eq!(opened_at, Position { line: 1, column: 1 });
            }
            other => panic!("expected UnexpectedEofInArray, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_delimiter_is_reported() {
        let err = parse_one("(1 2]", None).unwrap_err();
        assert!(matches!(err, ParseError::MismatchedDelimiter { .. }));
    }

    #[test]
    fn unexpected_closing_delimiter_at_top_level() {
        let err = parse_all(")", None).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedDelimiter { .. }));
    }

    #[test]
    fn macro_definition_expands_to_nothing_observable() {
        let forms = parse_all("(macro twice (x) (+ x x)) (twice 5)", None).unwrap();
        // One empty-array placeholder for the definition, one expanded call.
        assert_eq!(forms.len(), 2);
        match &forms[1] {
            Value::Array(items) => {
                let items = items.borrow();
                assert_eq!(items.len(), 3);
                assert_eq!(items[1], Value::Int(5));
                assert_eq!(items[2], Value::Int(5));
            }
            other => panic!("expected expanded call, got {other:?}"),
        }
    }

    #[test]
    fn macro_variadic_splices_remaining_args() {
        let forms = parse_all(
            "(macro my-list (& rest) (array & rest)) (my-list 1 2 3)",
            None,
        )
        .unwrap();
        match &forms[1] {
            Value::Array(items) => {
                let items = items.borrow();
                // (array & 1 2 3) -> head symbol `array`, then `&` isn't a
                // parameter name so it's left alone, then the spliced args.
                assert!(items.iter().any(|v| *v == Value::Int(1)));
                assert!(items.iter().any(|v| *v == Value::Int(3)));
            }
            other => panic!("expected expanded call, got {other:?}"),
        }
    }

    #[test]
    fn negative_number_via_reparsed_minus_identifier() {
        assert_eq!(parse("-42"), Value::Int(-42));
        match parse("-foo") {
            Value::Symbol(s) => assert_eq!(&*s.name, "-foo"),
            other => panic!("expected symbol, got {other:?}"),
        }
    }
}
