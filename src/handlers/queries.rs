//! Handlers driven by query parameters.
//!
//! Optional string inputs only appear in a response when non-empty.

use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::binding::BoundArgs;
use crate::catalog::{self, BOOK_ID_PREFIXES, BUMBUM_NAMES, INVALID_BOOK_ID, SPECIFIC_ITEMS};
use crate::handlers::{HandlerContext, HandlerError};

const LONG_DESCRIPTION: &str = "This is an amazing item with long description.";

/// Case transform applied to a rank id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankFormat {
    Title,
    Upper,
    Lower,
}

impl RankFormat {
    pub const NAMES: &'static [&'static str] = &["title", "upper", "lower"];

    pub fn apply(&self, input: &str) -> String {
        match self {
            RankFormat::Title => title_case(input),
            RankFormat::Upper => input.to_uppercase(),
            RankFormat::Lower => input.to_lowercase(),
        }
    }
}

impl FromStr for RankFormat {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(RankFormat::Title),
            "upper" => Ok(RankFormat::Upper),
            "lower" => Ok(RankFormat::Lower),
            other => Err(HandlerError::UnknownLiteral {
                kind: "rank format",
                value: other.to_string(),
            }),
        }
    }
}

/// Titlecase the first cased character of every run of cased characters and
/// lowercase the rest. Uncased characters (digits, CJK, punctuation) end a run.
fn title_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut prev_cased = false;
    for (i, &c) in chars.iter().enumerate() {
        if prev_cased {
            if c == 'Σ' {
                let final_sigma = !chars.get(i + 1).copied().is_some_and(is_cased);
                out.push(if final_sigma { 'ς' } else { 'σ' });
            } else {
                out.extend(c.to_lowercase());
            }
        } else {
            push_titlecase(&mut out, c);
        }
        prev_cased = is_cased(c);
    }
    out
}

fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase() || is_titlecase_letter(c)
}

/// General category Lt.
fn is_titlecase_letter(c: char) -> bool {
    matches!(
        c,
        '\u{01C5}'
            | '\u{01C8}'
            | '\u{01CB}'
            | '\u{01F2}'
            | '\u{1F88}'..='\u{1F8F}'
            | '\u{1F98}'..='\u{1F9F}'
            | '\u{1FA8}'..='\u{1FAF}'
            | '\u{1FBC}'
            | '\u{1FCC}'
            | '\u{1FFC}'
    )
}

/// Unicode titlecase mapping. Only the characters whose titlecase differs
/// from their uppercase are listed; everything else uppercases the first
/// char of its expansion and lowercases the remainder (`ß` becomes `Ss`).
fn push_titlecase(out: &mut String, c: char) {
    let single = match c {
        '\u{01C4}'..='\u{01C6}' => Some('\u{01C5}'),
        '\u{01C7}'..='\u{01C9}' => Some('\u{01C8}'),
        '\u{01CA}'..='\u{01CC}' => Some('\u{01CB}'),
        '\u{01F1}'..='\u{01F3}' => Some('\u{01F2}'),
        // Georgian Mkhedruli has no titlecase form.
        '\u{10D0}'..='\u{10FA}' | '\u{10FD}'..='\u{10FF}' => Some(c),
        '\u{1F80}'..='\u{1F87}' | '\u{1F90}'..='\u{1F97}' | '\u{1FA0}'..='\u{1FA7}' => {
            char::from_u32(c as u32 + 8)
        }
        c if is_titlecase_letter(c) => Some(c),
        '\u{1FB3}' => Some('\u{1FBC}'),
        '\u{1FC3}' => Some('\u{1FCC}'),
        '\u{1FF3}' => Some('\u{1FFC}'),
        _ => None,
    };
    if let Some(titled) = single {
        out.push(titled);
        return;
    }

    let expansion = match c {
        '\u{0149}' => Some("\u{02BC}N"),
        '\u{1FB2}' => Some("\u{1FBA}\u{0345}"),
        '\u{1FB4}' => Some("\u{0386}\u{0345}"),
        '\u{1FB7}' => Some("\u{0391}\u{0342}\u{0345}"),
        '\u{1FC2}' => Some("\u{1FCA}\u{0345}"),
        '\u{1FC4}' => Some("\u{0389}\u{0345}"),
        '\u{1FC7}' => Some("\u{0397}\u{0342}\u{0345}"),
        '\u{1FF2}' => Some("\u{1FFA}\u{0345}"),
        '\u{1FF4}' => Some("\u{038F}\u{0345}"),
        '\u{1FF7}' => Some("\u{03A9}\u{0342}\u{0345}"),
        _ => None,
    };
    if let Some(titled) = expansion {
        out.push_str(titled);
        return;
    }

    let mut upper = c.to_uppercase();
    if let Some(first) = upper.next() {
        out.push(first);
    }
    for rest in upper {
        out.extend(rest.to_lowercase());
    }
}

/// `items[start..stop]` where negative bounds count from the end and
/// out-of-range bounds clamp. Never fails.
fn slice_clamped<T>(items: &[T], start: i64, stop: i64) -> &[T] {
    let len = items.len() as i64;
    let normalize = |i: i64| if i < 0 { (i + len).max(0) } else { i.min(len) };
    let (start, stop) = (normalize(start), normalize(stop));
    if start >= stop {
        &[]
    } else {
        &items[start as usize..stop as usize]
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

pub fn list_bumbums(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let skip = args.int_saturating("skip")?;
    let limit = args.int_saturating("limit")?;

    let page: Vec<Value> = slice_clamped(&BUMBUM_NAMES, skip, skip.saturating_add(limit))
        .iter()
        .map(|name| json!({ "bumbum_name": name }))
        .collect();
    Ok(Value::Array(page))
}

pub fn optional_query(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let mut out = Map::new();
    out.insert("message".into(), json!("bumbum"));
    if let Some(q) = non_empty(args.opt_str("q")?) {
        out.insert("query".into(), json!(q));
    }
    Ok(Value::Object(out))
}

pub fn bool_query(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let rendered = if args.bool("short")? { "True" } else { "False" };
    Ok(json!({ "message": format!("What this bumbumless heretic says is {rendered}") }))
}

pub fn bumbum_item(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let mut out = Map::new();
    out.insert("item_id".into(), json!(args.str("item_id")?));
    out.insert("owner_id".into(), json!(args.integer("bumbum_id")?));
    if let Some(q) = non_empty(args.opt_str("q")?) {
        out.insert("q".into(), json!(q));
    }
    if !args.bool("short")? {
        out.insert("description".into(), json!(LONG_DESCRIPTION));
    }
    Ok(Value::Object(out))
}

pub fn required_query(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let needy = args.str("needy")?;
    Ok(json!({ "message": format!("BumBum needs that query: {needy}") }))
}

pub fn bumbum_rank(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let format: RankFormat = args.str("rank_format")?.parse()?;

    let mut out = Map::new();
    out.insert("bumbum_id".into(), json!(args.integer("bumbum_id")?));
    out.insert("rank_id".into(), json!(format.apply(args.str("rank_id")?)));
    out.insert("rank_division".into(), json!(args.integer("rank_division")?));
    if let Some(description) = non_empty(args.opt_str("description")?) {
        out.insert("description".into(), json!(description));
    }
    Ok(Value::Object(out))
}

pub fn specific_query(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    let items: Vec<Value> = SPECIFIC_ITEMS.iter().map(|id| json!({ "item_id": id })).collect();

    let mut out = Map::new();
    out.insert("items".into(), Value::Array(items));
    if let Some(q) = non_empty(args.opt_str("q")?) {
        out.insert("q".into(), json!(q));
    }
    Ok(Value::Object(out))
}

/// Echoes every occurrence of `q`, in request order, or `null`.
pub fn query_list(args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    Ok(match args.opt_list("q")? {
        Some(values) => json!(values),
        None => Value::Null,
    })
}

/// Book ids must carry one of the known source prefixes.
pub fn check_valid_id(id: &str) -> Result<(), String> {
    if BOOK_ID_PREFIXES.iter().any(|prefix| id.starts_with(prefix)) {
        Ok(())
    } else {
        Err(INVALID_BOOK_ID.to_string())
    }
}

pub fn custom_query_validation(args: &BoundArgs, ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
    match args.opt_str("id")? {
        Some(id) => Ok(json!({ "id": id, "name": catalog::book_title(id) })),
        None => {
            let (id, name) = catalog::random_book(ctx.picker).ok_or(HandlerError::EmptyCatalog("books"))?;
            Ok(json!({ "id": id, "name": name }))
        }
    }
}
