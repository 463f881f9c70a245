//! Label decoders
//!
//! Class boxes carry their structure as free text. Everything that turns a
//! label string into model values lives here, free of any XML, so each rule
//! can be exercised on its own:
//!
//! | label                              | result                                   |
//! |------------------------------------|------------------------------------------|
//! | `-name: String`                    | private attribute `name: String`         |
//! | `-tags: String[2..5]`              | attribute with multiplicity `2..5`       |
//! | `+/age: int`                       | public derived attribute                 |
//! | `+area(): double`                  | public method returning `double`         |
//! | `#load(path: String) throws IOException` | protected, throws `IOException`    |
//! | `<<interface>>` (header line)      | stereotype `interface`                   |

use std::sync::OnceLock;

use chumsky::prelude::*;
use regex::Regex;

use crate::core::chumsky_utils::{inline_whitespace, unsigned};
use crate::plugins::uml::{Attribute, Method, Multiplicity, Parameter, Visibility};

static HTML_BREAK_RE: OnceLock<Regex> = OnceLock::new();
static HTML_TAG_RE: OnceLock<Regex> = OnceLock::new();
static CHAR_REF_RE: OnceLock<Regex> = OnceLock::new();
static STEREOTYPE_RE: OnceLock<Regex> = OnceLock::new();
static GENERICS_RE: OnceLock<Regex> = OnceLock::new();
static BRACKET_RE: OnceLock<Regex> = OnceLock::new();
static THROWS_RE: OnceLock<Regex> = OnceLock::new();
static THROWS_KEYWORD_RE: OnceLock<Regex> = OnceLock::new();

/// Type given to attributes that declare none
pub const DEFAULT_ATTRIBUTE_TYPE: &str = "String";

/// Reduce a label to plain text.
///
/// Non-HTML labels are returned unchanged. HTML labels get line breaks for
/// `<br>`, `</div>` and `</p>`, lose every other tag, and have entities decoded.
pub fn plain_text(value: &str, html: bool) -> String {
    if !html {
        return value.to_string();
    }

    let breaks = HTML_BREAK_RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</div\s*>|</p\s*>").expect("html break regex must compile")
    });
    let tags = HTML_TAG_RE
        .get_or_init(|| Regex::new(r"<[^>]*>").expect("html tag regex must compile"));

    let text = breaks.replace_all(value, "\n");
    let text = tags.replace_all(&text, "");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    let char_refs = CHAR_REF_RE.get_or_init(|| {
        Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("char ref regex must compile")
    });
    let text = char_refs.replace_all(text, |caps: &regex::Captures<'_>| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&laquo;", "«")
        .replace("&raquo;", "»")
        .replace("&amp;", "&")
}

/// What a class box title says about the class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassHeader {
    /// First line, trimmed; may be empty
    pub name: String,
    pub stereotypes: Vec<String>,
    pub generics: Vec<String>,
}

/// Decode a class title.
///
/// The first line is the name. Stereotypes (`<<x>>` or `«x»`) and a generic
/// parameter list (`<T, U>`) are looked for on the remaining lines, with the
/// stereotypes removed first so they are never read as generics.
pub fn class_header(label: &str) -> ClassHeader {
    let mut lines = label.lines();
    let name = lines.next().unwrap_or_default().trim().to_string();
    let rest = lines.collect::<Vec<_>>().join("\n");

    let stereotype_re = STEREOTYPE_RE.get_or_init(|| {
        Regex::new(r"<<\s*(\w+)\s*>>|«\s*(\w+)\s*»").expect("stereotype regex must compile")
    });
    let stereotypes = stereotype_re
        .captures_iter(&rest)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect();

    let without_stereotypes = stereotype_re.replace_all(&rest, "");
    let generics_re = GENERICS_RE.get_or_init(|| {
        Regex::new(r"<\s*(\w+(?:\s*,\s*\w+)*)\s*>").expect("generics regex must compile")
    });
    let generics = generics_re
        .captures(&without_stereotypes)
        .map(|caps| caps[1].split(',').map(|g| g.trim().to_string()).collect())
        .unwrap_or_default();

    ClassHeader {
        name,
        stereotypes,
        generics,
    }
}

/// A member line decoded into model form
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMember {
    Attribute(Attribute),
    Method(Method),
}

/// Decode one member line.
///
/// A `(` makes it a method, otherwise a `:` makes it an attribute. Anything
/// else, or a method without a name, is `None`.
pub fn decode_member(line: &str) -> Option<DecodedMember> {
    let line = line.trim();
    if line.contains('(') {
        decode_method(line).map(DecodedMember::Method)
    } else if line.contains(':') {
        Some(DecodedMember::Attribute(decode_attribute(line)))
    } else {
        None
    }
}

/// Strip a leading visibility sigil
pub fn split_visibility(text: &str) -> (Option<Visibility>, &str) {
    let text = text.trim_start();
    match text.chars().next().and_then(Visibility::from_sigil) {
        Some(visibility) => (Some(visibility), &text[1..]),
        None => (None, text),
    }
}

/// Decode `[sigil][static] [final] [/]name : type[mult]`
pub fn decode_attribute(line: &str) -> Attribute {
    let (head, ty) = match line.split_once(':') {
        Some((head, ty)) => (head, ty.trim()),
        None => (line, ""),
    };

    let (visibility, head) = split_visibility(head);
    let mut is_static = false;
    let mut is_final = false;
    let mut words = head.split_whitespace().peekable();
    while let Some(&word) = words.peek() {
        match word {
            "static" => is_static = true,
            "final" => is_final = true,
            _ => break,
        }
        words.next();
    }
    let name = words.collect::<Vec<_>>().join(" ");
    let (name, is_derived) = match name.strip_prefix('/') {
        Some(name) => (name.trim_start().to_string(), true),
        None => (name, false),
    };

    let ty = if ty.is_empty() {
        DEFAULT_ATTRIBUTE_TYPE
    } else {
        ty
    };
    let (ty, multiplicity) = extract_multiplicity(ty);

    let mut attribute = Attribute::new(name, ty)
        .with_visibility(visibility.unwrap_or(Visibility::Private))
        .with_static(is_static)
        .with_final(is_final)
        .with_multiplicity(multiplicity.unwrap_or_default());
    attribute.is_derived = is_derived;
    attribute
}

/// Decode `[sigil]name(p: T[mult], ...)[: ret] [throws E, F]`.
///
/// `abstract`, `static` and `final` are recognised anywhere in the line, so
/// a method called `finalize` is also marked final.
pub fn decode_method(line: &str) -> Option<Method> {
    let (head, rest) = line.split_once('(')?;
    let (visibility, head) = split_visibility(head);
    let name = head.split_whitespace().last()?;

    let (params, tail) = rest.split_once(')').unwrap_or((rest, ""));

    let mut method = Method::new(name)
        .with_visibility(visibility.unwrap_or(Visibility::Public))
        .with_abstract(line.contains("abstract"))
        .with_static(line.contains("static"))
        .with_final(line.contains("final"));

    for parameter in split_parameters(params).into_iter().filter_map(decode_parameter) {
        method.parameters.push(parameter);
    }

    if let Some(return_type) = return_type(tail) {
        method.return_type = return_type;
    }

    let throws_re = THROWS_RE.get_or_init(|| {
        Regex::new(r"throws\s+(\w+(?:\s*,\s*\w+)*)").expect("throws regex must compile")
    });
    if let Some(caps) = throws_re.captures(line) {
        for exception in caps[1].split(',') {
            method.add_throws(exception.trim());
        }
    }

    Some(method)
}

/// Split a parameter list on commas that are not inside `<...>`
fn split_parameters(params: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&params[start..]);
    segments
}

fn decode_parameter(segment: &str) -> Option<Parameter> {
    let (name, ty) = segment.split_once(':')?;
    let (name, ty) = (name.trim(), ty.trim());
    if name.is_empty() || ty.is_empty() {
        return None;
    }
    let (ty, multiplicity) = extract_multiplicity(ty);
    Some(Parameter::new(name, ty).with_multiplicity(multiplicity.unwrap_or_default()))
}

/// Return type after the closing parenthesis, up to any `throws` clause
fn return_type(tail: &str) -> Option<String> {
    let declared = tail.trim_start().strip_prefix(':')?;
    let keyword = THROWS_KEYWORD_RE
        .get_or_init(|| Regex::new(r"\bthrows\b").expect("throws keyword regex must compile"));
    let declared = match keyword.find(declared) {
        Some(m) => &declared[..m.start()],
        None => declared,
    };
    let declared = declared.trim();
    (!declared.is_empty()).then(|| declared.to_string())
}

/// Pull a multiplicity token out of a type.
///
/// Only the first `[...]` is considered. When its content is a valid
/// multiplicity the token is removed; otherwise the type is returned as is,
/// so array types like `String[]` survive.
pub fn extract_multiplicity(ty: &str) -> (String, Option<Multiplicity>) {
    let bracket =
        BRACKET_RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]").expect("bracket regex must compile"));

    if let Some(caps) = bracket.captures(ty) {
        if let (Some(token), Some(m)) = (caps.get(0), parse_multiplicity(&caps[1])) {
            let mut stripped = String::with_capacity(ty.len());
            stripped.push_str(&ty[..token.start()]);
            stripped.push_str(&ty[token.end()..]);
            return (stripped.trim().to_string(), Some(m));
        }
    }
    (ty.trim().to_string(), None)
}

/// Parse `n`, `*`, `n..m` or `n..*`
pub fn parse_multiplicity(text: &str) -> Option<Multiplicity> {
    multiplicity_parser()
        .parse(text)
        .into_result()
        .ok()
        .flatten()
}

/// Yields `None` for well-formed but invalid bounds (`5..2`, overflow)
fn multiplicity_parser<'src>() -> impl Parser<'src, &'src str, Option<Multiplicity>> + Clone {
    let upper = choice((
        just('*').to(Some(None::<u32>)),
        unsigned().map(|n| n.map(Some)),
    ));

    let range = unsigned()
        .then_ignore(just(".."))
        .then(upper)
        .map(|(min, max)| match (min, max) {
            (Some(min), Some(max)) => Multiplicity::new(min, max),
            _ => None,
        });

    let many = just('*').to(Some(Multiplicity::MANY));
    let exact = unsigned().map(|n| n.map(Multiplicity::exactly));

    inline_whitespace()
        .ignore_then(choice((many, range, exact)))
        .then_ignore(inline_whitespace())
        .then_ignore(end())
}

/// Text attached to one end of an edge
#[derive(Debug, Clone, PartialEq)]
pub enum EndLabel {
    Multiplicity(Multiplicity),
    Role(String),
}

/// Classify each non-empty line of an edge label
pub fn end_labels(text: &str) -> Vec<EndLabel> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let inner = line
                .strip_prefix('[')
                .and_then(|l| l.strip_suffix(']'))
                .unwrap_or(line);
            match parse_multiplicity(inner) {
                Some(m) => EndLabel::Multiplicity(m),
                None => EndLabel::Role(line.to_string()),
            }
        })
        .collect()
}
