//! XML type manifest parser.
//!
//! This module parses catalog manifests into a [`TypeCatalog`], and the
//! type-expression syntax used by field `type` attributes:
//!
//! ```text
//! expr := name ('[' expr (',' expr)* ']')? ('[]')*
//! ```

use crate::catalog::TypeCatalog;
use crate::error::{ParseError, SchemaError};
use crate::types::{FieldDef, PrimitiveType, TypeDef, TypeKind, TypeRef};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

/// Parses a type manifest from a string.
///
/// # Arguments
/// * `xml` - Manifest content
///
/// # Returns
/// Parsed catalog or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or contains invalid elements.
pub fn parse_catalog(xml: &str) -> Result<TypeCatalog, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut catalog: Option<TypeCatalog> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "catalog" if catalog.is_none() => catalog = Some(TypeCatalog::new()),
                    "type" => {
                        let type_def = parse_type(&mut reader, e)?;
                        add_type(open_catalog(&mut catalog, name)?, type_def)?;
                    }
                    "enum" => {
                        let type_def = parse_type_header(e, "enum")?;
                        skip_element(&mut reader)?;
                        add_type(open_catalog(&mut catalog, name)?, type_def)?;
                    }
                    other if catalog.is_some() => {
                        return Err(ParseError::unknown_element(other, "catalog"));
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "catalog" if catalog.is_none() => catalog = Some(TypeCatalog::new()),
                    "type" | "enum" => {
                        let type_def = parse_type_header(e, name)?;
                        add_type(open_catalog(&mut catalog, name)?, type_def)?;
                    }
                    other if catalog.is_some() => {
                        return Err(ParseError::unknown_element(other, "catalog"));
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    catalog.ok_or_else(|| ParseError::InvalidStructure {
        message: "No catalog element found".to_string(),
    })
}

/// Parses a type manifest file.
///
/// # Errors
/// Returns `ParseError` if reading or parsing fails.
pub fn parse_catalog_file(path: &Path) -> Result<TypeCatalog, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_catalog(&xml)
}

fn open_catalog<'c>(
    catalog: &'c mut Option<TypeCatalog>,
    element: &str,
) -> Result<&'c mut TypeCatalog, ParseError> {
    catalog.as_mut().ok_or_else(|| ParseError::InvalidStructure {
        message: format!("'{element}' outside of catalog"),
    })
}

fn add_type(catalog: &mut TypeCatalog, type_def: TypeDef) -> Result<(), ParseError> {
    catalog.add_type(type_def).map_err(|err| match err {
        SchemaError::DuplicateDefinition { name } => ParseError::DuplicateDefinition { name },
        other => ParseError::InvalidStructure {
            message: other.to_string(),
        },
    })
}

/// Parses a `<type>` element with field children.
fn parse_type(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<TypeDef, ParseError> {
    let mut type_def = parse_type_header(e, "type")?;
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                if tag_name != "field" {
                    return Err(ParseError::unknown_element(tag_name, "type"));
                }
                type_def.fields.push(parse_field(e)?);
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                if tag_name != "field" {
                    return Err(ParseError::unknown_element(tag_name, "type"));
                }
                type_def.fields.push(parse_field(e)?);
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated type '{}'", type_def.name),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(type_def)
}

/// Consumes events up to and including the end tag of the current element.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: "unexpected end of manifest".to_string(),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }
}

/// Parses the attributes of a `<type>` or `<enum>` element.
fn parse_type_header(e: &BytesStart<'_>, element: &str) -> Result<TypeDef, ParseError> {
    let mut name = None;
    let mut namespace = String::new();
    let mut declaring_type = None;
    let mut kind = if element == "enum" {
        TypeKind::Enum
    } else {
        TypeKind::Class
    };
    let mut default_constructor = None;
    let mut formatter = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "namespace" => namespace = value.to_string(),
            "declaringType" => declaring_type = Some(value.to_string()),
            "kind" if element == "type" => {
                kind = TypeKind::parse(value)
                    .ok_or_else(|| ParseError::invalid_attr(element, "kind", value))?
            }
            "defaultConstructor" => {
                default_constructor = Some(parse_bool(element, "defaultConstructor", value)?)
            }
            "formatter" => formatter = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr(element, "name"))?;
    let mut type_def = TypeDef::new(name, namespace, kind);
    type_def.declaring_type = declaring_type;
    type_def.formatter = formatter;
    if let Some(has_ctor) = default_constructor {
        type_def.has_default_constructor = has_ctor;
    }

    Ok(type_def)
}

/// Parses a `<field>` element.
fn parse_field(e: &BytesStart<'_>) -> Result<FieldDef, ParseError> {
    let mut name = None;
    let mut ty = None;
    let mut is_static = false;
    let mut is_public = true;
    let mut ignore = false;
    let mut non_serialized = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "type" => ty = Some(parse_type_expr(value)?),
            "static" => is_static = parse_bool("field", key, value)?,
            "public" => is_public = parse_bool("field", key, value)?,
            "ignore" => ignore = parse_bool("field", key, value)?,
            "nonSerialized" => non_serialized = parse_bool("field", key, value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("field", "name"))?;
    let ty = ty.ok_or_else(|| ParseError::missing_attr("field", "type"))?;

    Ok(FieldDef {
        name,
        ty,
        is_static,
        is_public,
        ignore_data_member: ignore,
        non_serialized,
    })
}

fn parse_bool(element: &str, attribute: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParseError::invalid_attr(element, attribute, value)),
    }
}

/// Parses a type expression such as `` System.Collections.Generic.List`1[int][] ``.
///
/// Names matching a primitive (alias, runtime name or full name) become
/// [`TypeRef::Primitive`]; every other name is a [`TypeRef::Named`].
///
/// # Errors
/// Returns `ParseError::InvalidTypeExpression` on malformed input.
pub fn parse_type_expr(expr: &str) -> Result<TypeRef, ParseError> {
    let mut parser = TypeExprParser {
        expr,
        chars: expr.char_indices().peekable(),
    };
    let ty = parser.parse()?;
    parser.skip_ws();
    match parser.chars.peek() {
        None => Ok(ty),
        Some(&(pos, c)) => Err(ParseError::type_expr(
            expr,
            format!("unexpected '{c}' at {pos}"),
        )),
    }
}

struct TypeExprParser<'a> {
    expr: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl TypeExprParser<'_> {
    fn parse(&mut self) -> Result<TypeRef, ParseError> {
        self.skip_ws();
        let name = self.parse_name()?;

        let mut ty = if self.peek_is('[') && !self.peek_array_suffix() {
            self.chars.next();
            let mut args = vec![self.parse()?];
            loop {
                self.skip_ws();
                match self.chars.next() {
                    Some((_, ',')) => args.push(self.parse()?),
                    Some((_, ']')) => break,
                    Some((pos, c)) => {
                        return Err(self.error(format!("unexpected '{c}' at {pos}")));
                    }
                    None => return Err(self.error("unterminated generic argument list")),
                }
            }
            if PrimitiveType::from_name(&name).is_some() {
                return Err(self.error(format!("primitive '{name}' cannot take type arguments")));
            }
            TypeRef::Generic {
                definition: name,
                args,
            }
        } else {
            match PrimitiveType::from_name(&name) {
                Some(primitive) => TypeRef::Primitive(primitive),
                None => TypeRef::Named(name),
            }
        };

        while self.peek_array_suffix() {
            self.chars.next();
            self.chars.next();
            ty = TypeRef::array(ty);
        }

        Ok(ty)
    }

    fn parse_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if matches!(c, '[' | ']' | ',') || c.is_whitespace() {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }
        Ok(name)
    }

    fn peek_is(&mut self, expected: char) -> bool {
        self.chars.peek().is_some_and(|&(_, c)| c == expected)
    }

    fn peek_array_suffix(&self) -> bool {
        let mut ahead = self.chars.clone();
        matches!(
            (ahead.next(), ahead.next()),
            (Some((_, '[')), Some((_, ']')))
        )
    }

    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::type_expr(self.expr, message)
    }
}
