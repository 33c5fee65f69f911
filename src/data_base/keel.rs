//! Reader for KEEL-formatted dataset files (`@attribute ...` header, then `@data`).
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use super::{DataBase, Dataset, Example, FuzzyVariable, NominalVariable, Variable};
use crate::error::{FuzzyChiError, Result};

#[derive(Debug, Clone, PartialEq)]
enum AttributeDomain {
    Nominal(Vec<String>),
    Real(f64, f64),
    Integer(f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
struct Attribute {
    name: String,
    domain: AttributeDomain,
}

fn header_error(line: usize, message: impl Into<String>) -> FuzzyChiError {
    FuzzyChiError::Header {
        line,
        message: message.into(),
    }
}

/// Splits `@keyword rest` into the lowercase keyword and the rest of the line.
fn split_keyword(line: &str) -> (String, &str) {
    let mut parts = line.splitn(2, char::is_whitespace);
    let keyword = parts.next().unwrap_or("").to_lowercase();
    let rest = parts.next().unwrap_or("").trim();
    (keyword, rest)
}

fn parse_attribute(line_number: usize, rest: &str) -> Result<Attribute> {
    let name_end = rest
        .find(|c: char| c.is_whitespace() || c == '{' || c == '[')
        .unwrap_or(rest.len());
    let name = rest[..name_end].trim().to_string();
    if name.is_empty() {
        return Err(header_error(line_number, "Invalid attribute name"));
    }
    let domain = rest[name_end..].trim();

    if let Some(open) = domain.find('{') {
        let close = domain
            .rfind('}')
            .ok_or_else(|| header_error(line_number, format!("Unterminated value list for {}", name)))?;
        let values: Vec<String> = domain[open + 1..close]
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(header_error(line_number, format!("No values specified for {}", name)));
        }
        return Ok(Attribute {
            name,
            domain: AttributeDomain::Nominal(values),
        });
    }

    let open = domain
        .find('[')
        .ok_or_else(|| header_error(line_number, format!("Values are not specified for {}", name)))?;
    let close = domain
        .rfind(']')
        .ok_or_else(|| header_error(line_number, format!("Unterminated range for {}", name)))?;
    let kind = domain[..open].trim().to_lowercase();
    let bounds: Vec<f64> = domain[open + 1..close]
        .split(',')
        .map(|b| b.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| header_error(line_number, format!("Invalid range for {}", name)))?;
    if bounds.len() != 2 {
        return Err(header_error(line_number, format!("Range of {} needs two bounds", name)));
    }
    let (lower, upper) = (bounds[0], bounds[1]);

    let domain = match kind.as_str() {
        "real" => AttributeDomain::Real(lower, upper),
        "integer" => AttributeDomain::Integer(lower, upper),
        "" => return Err(header_error(line_number, format!("No attribute type is specified for {}", name))),
        other => return Err(header_error(line_number, format!("Invalid attribute type: '{}'", other))),
    };
    Ok(Attribute { name, domain })
}

fn build_variable(attribute: Attribute, n_labels: usize) -> Result<Variable> {
    let Attribute { name, domain } = attribute;
    let variable = match domain {
        AttributeDomain::Nominal(values) => Variable::Nominal(NominalVariable::new(name, values)),
        // Small integer domains are treated as categories
        AttributeDomain::Integer(lower, upper) if upper - lower + 1.0 <= n_labels as f64 => {
            let values = (lower as i64..=upper as i64).map(|v| v.to_string()).collect();
            Variable::Nominal(NominalVariable::new(name, values))
        }
        AttributeDomain::Integer(lower, upper) | AttributeDomain::Real(lower, upper) => {
            Variable::Fuzzy(FuzzyVariable::uniform(name, lower, upper, n_labels)?)
        }
    };
    Ok(variable)
}

/// Builds the data base described by a header, stopping at `@data`.
pub fn parse_header<R: BufRead>(reader: R, n_labels: usize) -> Result<DataBase> {
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut output: Option<String> = None;
    let mut found_data = false;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let (keyword, rest) = split_keyword(line);
        match keyword.as_str() {
            "@attribute" => attributes.push(parse_attribute(line_number, rest)?),
            "@outputs" | "@output" => {
                let outputs: Vec<&str> = rest
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                    .collect();
                if outputs.len() != 1 {
                    return Err(header_error(
                        line_number,
                        "This algorithm does not support multiple outputs",
                    ));
                }
                output = Some(outputs[0].to_string());
            }
            "@data" => {
                found_data = true;
                break;
            }
            _ => {}
        }
    }

    if !found_data {
        return Err(header_error(0, "Missing @data section"));
    }

    let output_position = match &output {
        Some(name) => attributes
            .iter()
            .position(|a| &a.name == name)
            .ok_or_else(|| header_error(0, format!("Output attribute {} is not declared", name)))?,
        None => attributes
            .len()
            .checked_sub(1)
            .ok_or_else(|| header_error(0, "No attributes declared"))?,
    };
    let class_attribute = attributes.remove(output_position);
    let class_labels = match class_attribute.domain {
        AttributeDomain::Nominal(values) => values,
        _ => {
            return Err(header_error(
                0,
                format!("Output attribute {} must be nominal", class_attribute.name),
            ))
        }
    };

    let variables = attributes
        .into_iter()
        .map(|attribute| build_variable(attribute, n_labels))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        "Parsed header with {} variables and {} classes",
        variables.len(),
        class_labels.len()
    );

    DataBase::new(variables, class_labels, n_labels)
}

/// Reads the examples of a KEEL file. Header lines are skipped.
pub fn parse_dataset<R: BufRead>(reader: R, data_base: &DataBase) -> Result<Dataset> {
    let expected_fields = data_base.num_variables() + 1;
    let mut examples: Vec<Example> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('@') {
            continue;
        }

        let tokens: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.len() != expected_fields {
            return Err(FuzzyChiError::DimensionMismatch {
                row: line_number,
                expected: data_base.num_variables(),
                found: tokens.len().saturating_sub(1),
            });
        }

        let (class_token, value_tokens) = tokens
            .split_last()
            .ok_or_else(|| FuzzyChiError::Data {
                line: line_number,
                message: "Empty row".to_string(),
            })?;
        let values = data_base
            .variables()
            .iter()
            .zip(value_tokens)
            .map(|(variable, token)| variable.parse_value(token))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| FuzzyChiError::Data {
                line: line_number,
                message: e.to_string(),
            })?;
        let class_index = data_base
            .class_index(class_token)
            .ok_or_else(|| FuzzyChiError::UnknownClass(class_token.to_string()))?;

        examples.push(Example::new(values, class_index));
    }

    Ok(Dataset::new(examples))
}

pub fn load_data_base<P: AsRef<Path>>(path: P, n_labels: usize) -> Result<DataBase> {
    let file = File::open(path.as_ref())?;
    parse_header(BufReader::new(file), n_labels)
}

pub fn load_dataset<P: AsRef<Path>>(path: P, data_base: &DataBase) -> Result<Dataset> {
    let file = File::open(path.as_ref())?;
    parse_dataset(BufReader::new(file), data_base)
}
