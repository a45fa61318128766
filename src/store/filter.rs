//! Evaluation of MongoDB-style queries against JSON documents.
//!
//! Supported operators are `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$all`,
//! `$exists`, `$size`, `$regex` (with `$options`), `$elemMatch`, `$not`, `$and`, `$or` and
//! `$nor`. Field names may be dotted paths; arrays met along a path are traversed.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::query::{QueryFragment, SortDirection};

/// Values found at a dotted path within a document.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            descend(value, segment, &mut next);
        }
        current = next;
    }
    current
}

fn descend<'a>(value: &'a Value, segment: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => out.extend(map.get(segment)),
        Value::Array(items) => {
            if let Some(item) = segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                out.push(item);
                return;
            }
            for item in items {
                if let Value::Object(map) = item {
                    out.extend(map.get(segment));
                }
            }
        }
        _ => {}
    }
}

/// Return whether `doc` satisfies `criteria`.
pub fn matches(doc: &Value, criteria: &Map<String, Value>) -> Result<bool, ApiError> {
    for (key, condition) in criteria {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches(doc, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" | "$nor" => {
                let mut any = false;
                for clause in clauses(key, condition)? {
                    if matches(doc, clause)? {
                        any = true;
                        break;
                    }
                }
                if key == "$or" {
                    any
                } else {
                    !any
                }
            }
            operator if operator.starts_with('$') => {
                return Err(ApiError::InvalidCriteria(format!(
                    "unsupported top level operator {operator}"
                )))
            }
            field => field_matches(&lookup(doc, field), condition)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses<'a>(operator: &str, value: &'a Value) -> Result<Vec<&'a Map<String, Value>>, ApiError> {
    let items = value
        .as_array()
        .ok_or_else(|| ApiError::InvalidCriteria(format!("{operator} requires an array")))?;
    items
        .iter()
        .map(|item| {
            item.as_object().ok_or_else(|| {
                ApiError::InvalidCriteria(format!("{operator} clauses must be objects"))
            })
        })
        .collect()
}

fn is_operator_expression(condition: &Value) -> bool {
    matches!(condition, Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')))
}

fn field_matches(values: &[&Value], condition: &Value) -> Result<bool, ApiError> {
    match condition {
        Value::Object(operators) if is_operator_expression(condition) => {
            let options = operators
                .get("$options")
                .and_then(Value::as_str)
                .unwrap_or_default();
            for (operator, argument) in operators {
                if !apply_operator(values, operator, argument, options)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(any_equal(values, condition)),
    }
}

fn apply_operator(
    values: &[&Value],
    operator: &str,
    argument: &Value,
    options: &str,
) -> Result<bool, ApiError> {
    let matched = match operator {
        "$eq" => any_equal(values, argument),
        "$ne" => !any_equal(values, argument),
        "$gt" => any_ordered(values, argument, |o| o == Ordering::Greater),
        "$gte" => any_ordered(values, argument, |o| o != Ordering::Less),
        "$lt" => any_ordered(values, argument, |o| o == Ordering::Less),
        "$lte" => any_ordered(values, argument, |o| o != Ordering::Greater),
        "$in" => array_argument(operator, argument)?
            .iter()
            .any(|item| any_equal(values, item)),
        "$nin" => !array_argument(operator, argument)?
            .iter()
            .any(|item| any_equal(values, item)),
        "$all" => {
            let items = array_argument(operator, argument)?;
            !items.is_empty() && items.iter().all(|item| any_equal(values, item))
        }
        "$exists" => truthy(argument) != values.is_empty(),
        "$size" => {
            let size = argument.as_u64().ok_or_else(|| {
                ApiError::InvalidCriteria("$size requires a non-negative integer".to_string())
            })?;
            values
                .iter()
                .any(|value| matches!(value, Value::Array(items) if items.len() as u64 == size))
        }
        "$regex" => {
            let pattern = argument.as_str().ok_or_else(|| {
                ApiError::InvalidCriteria("$regex requires a string".to_string())
            })?;
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(options.contains('i'))
                .multi_line(options.contains('m'))
                .dot_matches_new_line(options.contains('s'))
                .ignore_whitespace(options.contains('x'))
                .build()
                .map_err(|err| ApiError::InvalidCriteria(err.to_string()))?;
            flatten(values)
                .iter()
                .filter_map(|value| value.as_str())
                .any(|text| regex.is_match(text))
        }
        "$options" => true,
        "$elemMatch" => {
            let criteria = argument.as_object().ok_or_else(|| {
                ApiError::InvalidCriteria("$elemMatch requires an object".to_string())
            })?;
            let mut any = false;
            'outer: for value in values {
                let Value::Array(items) = value else {
                    continue;
                };
                for item in items {
                    let matched = if is_operator_expression(argument) {
                        field_matches(&[item], argument)?
                    } else {
                        item.is_object() && matches(item, criteria)?
                    };
                    if matched {
                        any = true;
                        break 'outer;
                    }
                }
            }
            any
        }
        "$not" => !field_matches(values, argument)?,
        _ => {
            return Err(ApiError::InvalidCriteria(format!(
                "unsupported operator {operator}"
            )))
        }
    };
    Ok(matched)
}

fn array_argument<'a>(operator: &str, argument: &'a Value) -> Result<&'a Vec<Value>, ApiError> {
    argument
        .as_array()
        .ok_or_else(|| ApiError::InvalidCriteria(format!("{operator} requires an array")))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// Each value followed by its elements if it is an array.
fn flatten<'a>(values: &[&'a Value]) -> Vec<&'a Value> {
    let mut flat = Vec::new();
    for value in values {
        flat.push(*value);
        if let Value::Array(items) = value {
            flat.extend(items.iter());
        }
    }
    flat
}

fn any_equal(values: &[&Value], target: &Value) -> bool {
    if target.is_null() && values.is_empty() {
        return true;
    }
    flatten(values)
        .iter()
        .any(|value| values_equal(value, target))
}

fn any_ordered(values: &[&Value], target: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    flatten(values)
        .iter()
        .filter_map(|value| compare_same_type(value, target))
        .any(accept)
}

/// Equality with numbers compared by value, so that `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

/// Total order over values: null, numbers, strings, objects, arrays, booleans.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    type_rank(a)
        .cmp(&type_rank(b))
        .then_with(|| compare_same_type(a, b).unwrap_or(Ordering::Equal))
}

static NULL: Value = Value::Null;

/// Stable sort by the given keys. Missing fields sort as null.
pub fn sort_documents(docs: &mut [&Value], keys: &[(String, SortDirection)]) {
    docs.sort_by(|a, b| {
        keys.iter()
            .map(|(field, direction)| {
                let x = lookup(a, field).first().copied().unwrap_or(&NULL);
                let y = lookup(b, field).first().copied().unwrap_or(&NULL);
                match direction {
                    SortDirection::Ascending => compare_values(x, y),
                    SortDirection::Descending => compare_values(y, x),
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// Project `doc` onto `properties`, which may be dotted paths.
///
/// All fields are kept when `properties` is `None`. `_id` is never returned.
pub fn project(doc: &Value, properties: Option<&[String]>) -> Value {
    let Value::Object(map) = doc else {
        return doc.clone();
    };
    match properties {
        None => {
            let mut projected = map.clone();
            projected.remove("_id");
            Value::Object(projected)
        }
        Some(properties) => {
            let mut projected = Map::new();
            for property in properties.iter().filter(|p| *p != "_id") {
                copy_path(map, &mut projected, property);
            }
            Value::Object(projected)
        }
    }
}

fn copy_path(source: &Map<String, Value>, target: &mut Map<String, Value>, path: &str) {
    let Some((head, rest)) = path.split_once('.') else {
        if let Some(value) = source.get(path) {
            target.insert(path.to_string(), value.clone());
        }
        return;
    };
    let created = !target.contains_key(head);
    match source.get(head) {
        Some(Value::Object(child)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child_target) = entry {
                copy_path(child, child_target, rest);
            }
        }
        Some(Value::Array(items)) => {
            let entry = target.entry(head.to_string()).or_insert_with(|| {
                Value::Array(items.iter().map(|_| Value::Object(Map::new())).collect())
            });
            if let Value::Array(projected) = entry {
                for (item, out) in items.iter().zip(projected.iter_mut()) {
                    if let (Value::Object(item), Value::Object(out)) = (item, out) {
                        copy_path(item, out, rest);
                    }
                }
            }
        }
        _ => {}
    }
    if created && matches!(target.get(head), Some(Value::Object(m)) if m.is_empty()) {
        target.remove(head);
    }
}

/// Run a query over `docs`: filter, sort, skip, limit and project, in that order.
///
/// A limit of zero returns all remaining documents.
pub fn execute<'a, I>(docs: I, query: &QueryFragment) -> Result<Vec<Value>, ApiError>
where
    I: IntoIterator<Item = &'a Value>,
{
    let criteria = query.criteria();
    let mut matched = Vec::new();
    for doc in docs {
        if matches(doc, &criteria)? {
            matched.push(doc);
        }
    }
    let keys = query.sort_keys();
    if !keys.is_empty() {
        sort_documents(&mut matched, &keys);
    }
    let skip = query.skip.unwrap_or(0) as usize;
    let limit = match query.limit {
        Some(limit) if limit > 0 => limit as usize,
        _ => usize::MAX,
    };
    Ok(matched
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|doc| project(doc, query.properties.as_deref()))
        .collect())
}

/// Number of documents matching `criteria`.
pub fn count<'a, I>(docs: I, criteria: &Map<String, Value>) -> Result<u64, ApiError>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut total = 0;
    for doc in docs {
        if matches(doc, criteria)? {
            total += 1;
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(doc: &Value, criteria: Value) -> bool {
        let Value::Object(criteria) = criteria else {
            panic!("criteria must be an object")
        };
        matches(doc, &criteria).unwrap()
    }

    fn doc() -> Value {
        json!({
            "_id": 1,
            "task_id": "mp-149",
            "nelements": 1,
            "elements": ["Si"],
            "volume": 40.9,
            "deprecated": false,
            "symmetry": {"crystal_system": "Cubic", "number": 227},
            "entries": [{"energy": -10.0}, {"energy": -12.5}],
        })
    }

    #[test]
    fn equality() {
        let doc = doc();
        assert!(check(&doc, json!({"task_id": "mp-149"})));
        assert!(check(&doc, json!({"nelements": 1.0})));
        assert!(check(&doc, json!({"elements": "Si"})));
        assert!(check(&doc, json!({"symmetry.number": 227})));
        assert!(!check(&doc, json!({"task_id": "mp-1"})));
        assert!(check(&doc, json!({"missing": null})));
        assert!(check(&doc, json!({})));
    }

    #[test]
    fn comparisons() {
        let doc = doc();
        assert!(check(&doc, json!({"volume": {"$gte": 40, "$lte": 41}})));
        assert!(!check(&doc, json!({"volume": {"$gt": 40.9}})));
        assert!(check(&doc, json!({"volume": {"$lt": 41}})));
        assert!(check(&doc, json!({"entries.energy": {"$lt": -12}})));
        assert!(!check(&doc, json!({"task_id": {"$gt": 3}})));
        assert!(check(&doc, json!({"volume": {"$gte": 0}})));
    }

    #[test]
    fn sets() {
        let doc = doc();
        assert!(check(&doc, json!({"task_id": {"$in": ["mp-1", "mp-149"]}})));
        assert!(check(&doc, json!({"elements": {"$nin": ["O"]}})));
        assert!(!check(&doc, json!({"elements": {"$all": ["Si", "O"]}})));
        assert!(check(&doc, json!({"elements": {"$all": ["Si"]}})));
        assert!(!check(&doc, json!({"elements": {"$all": []}})));
        assert!(check(&doc, json!({"task_id": {"$ne": "mp-1"}})));
        assert!(check(&doc, json!({"elements": {"$size": 1}})));
    }

    #[test]
    fn exists() {
        let doc = doc();
        assert!(check(&doc, json!({"volume": {"$exists": true}})));
        assert!(check(&doc, json!({"density": {"$exists": false}})));
        assert!(!check(&doc, json!({"density": {"$exists": 1}})));
    }

    #[test]
    fn regex() {
        let doc = doc();
        assert!(check(&doc, json!({"symmetry.crystal_system": {"$regex": "^cub", "$options": "i"}})));
        assert!(!check(&doc, json!({"symmetry.crystal_system": {"$regex": "^cub"}})));
        let Value::Object(criteria) = json!({"task_id": {"$regex": "("}}) else {
            unreachable!()
        };
        assert!(matches!(
            matches(&doc, &criteria),
            Err(ApiError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn logical() {
        let doc = doc();
        assert!(check(&doc, json!({"$or": [{"task_id": "mp-1"}, {"nelements": 1}]})));
        assert!(!check(&doc, json!({"$and": [{"task_id": "mp-149"}, {"nelements": 2}]})));
        assert!(check(&doc, json!({"$nor": [{"task_id": "mp-1"}, {"nelements": 2}]})));
        assert!(check(&doc, json!({"volume": {"$not": {"$gt": 50}}})));
    }

    #[test]
    fn elem_match() {
        let doc = doc();
        assert!(check(&doc, json!({"entries": {"$elemMatch": {"energy": {"$lt": -11}}}})));
        assert!(!check(&doc, json!({"entries": {"$elemMatch": {"energy": {"$gt": 0}}}})));
        assert!(check(&doc, json!({"elements": {"$elemMatch": {"$eq": "Si"}}})));
    }

    #[test]
    fn unsupported_operator() {
        let Value::Object(criteria) = json!({"volume": {"$near": 1}}) else {
            unreachable!()
        };
        assert!(matches(&doc(), &criteria).is_err());
    }

    #[test]
    fn projection() {
        let doc = doc();
        let fields = vec![
            "task_id".to_string(),
            "symmetry.number".to_string(),
            "entries.energy".to_string(),
            "missing.field".to_string(),
            "_id".to_string(),
        ];
        assert_eq!(
            json!({
                "task_id": "mp-149",
                "symmetry": {"number": 227},
                "entries": [{"energy": -10.0}, {"energy": -12.5}],
            }),
            project(&doc, Some(&fields))
        );
        assert!(project(&doc, None).get("_id").is_none());
    }

    #[test]
    fn pipeline() {
        let docs: Vec<Value> = (0..10)
            .map(|i| json!({"task_id": format!("mp-{i}"), "nsites": i % 4}))
            .collect();
        let query: QueryFragment = serde_json::from_value(json!({
            "criteria": {"nsites": {"$gte": 1}},
            "sort": {"nsites": -1, "task_id": 1},
            "skip": 1,
            "limit": 3,
            "properties": ["task_id"],
        }))
        .unwrap();
        assert_eq!(
            vec![
                json!({"task_id": "mp-7"}),
                json!({"task_id": "mp-2"}),
                json!({"task_id": "mp-6"}),
            ],
            execute(&docs, &query).unwrap()
        );
        assert_eq!(7, count(&docs, &query.criteria()).unwrap());
    }

    #[test]
    fn sort_missing_first() {
        let docs = vec![json!({"a": 2}), json!({}), json!({"a": 1})];
        let mut refs: Vec<&Value> = docs.iter().collect();
        sort_documents(&mut refs, &[("a".to_string(), SortDirection::Ascending)]);
        assert_eq!(vec![&docs[1], &docs[2], &docs[0]], refs);
    }
}
