use super::{Evaluation, ExpressionError, ExpressionEvaluator};
use crate::config::ScriptLimits;
use rhai::{Array, Dynamic, Engine, FLOAT, INT, ImmutableString, Map, Scope};
use serde_json::{Number, Value as Json};

/// Rhai-backed evaluator. Strict variables keep scripts confined to their
/// declared parameters; limits bound every run.
pub struct RhaiEvaluator {
    engine: Engine,
}

impl RhaiEvaluator {
    pub fn new(limits: ScriptLimits) -> Self {
        let mut engine = Engine::new();
        engine.set_strict_variables(true);
        engine.set_max_operations(limits.max_operations);
        engine.set_max_call_levels(limits.max_call_levels);
        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
        engine.set_max_string_size(limits.max_string_size);
        engine.disable_symbol("eval");
        engine.on_print(|text| tracing::info!(target: "activity_form::script", "{text}"));
        engine.on_debug(|text, source, pos| {
            tracing::debug!(
                target: "activity_form::script",
                source = source.unwrap_or_default(),
                position = %pos,
                "{text}"
            );
        });
        Self { engine }
    }
}

impl Default for RhaiEvaluator {
    fn default() -> Self {
        Self::new(ScriptLimits::default())
    }
}

impl ExpressionEvaluator for RhaiEvaluator {
    fn evaluate(
        &self,
        params: &[&str],
        body: &str,
        args: Vec<Json>,
    ) -> Result<Evaluation, ExpressionError> {
        if params.len() != args.len() {
            return Err(ExpressionError::Arity {
                expected: params.len(),
                actual: args.len(),
            });
        }

        let mut scope = Scope::new();
        for (name, arg) in params.iter().zip(args.iter()) {
            scope.push_dynamic(*name, json_to_dynamic(arg));
        }

        let ast = self
            .engine
            .compile_with_scope(&scope, body)
            .map_err(|err| ExpressionError::Compile(err.to_string()))?;

        let value = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|err| ExpressionError::Runtime(err.to_string()))?;

        let bindings = params
            .iter()
            .map(|name| {
                let value = scope
                    .get_value::<Dynamic>(name)
                    .map(dynamic_to_json)
                    .unwrap_or(Json::Null);
                (name.to_string(), value)
            })
            .collect();

        Ok(Evaluation {
            value: dynamic_to_json(value),
            bindings,
        })
    }
}

fn json_to_dynamic(value: &Json) -> Dynamic {
    match value {
        Json::Null => Dynamic::UNIT,
        Json::Bool(value) => Dynamic::from_bool(*value),
        Json::Number(number) => match number.as_i64() {
            Some(value) => Dynamic::from_int(value as INT),
            None => Dynamic::from_float(number.as_f64().unwrap_or(FLOAT::NAN)),
        },
        Json::String(value) => Dynamic::from(value.clone()),
        Json::Array(values) => {
            let array: Array = values.iter().map(json_to_dynamic).collect();
            Dynamic::from_array(array)
        }
        Json::Object(values) => {
            let mut map = Map::new();
            for (key, value) in values {
                map.insert(key.as_str().into(), json_to_dynamic(value));
            }
            Dynamic::from_map(map)
        }
    }
}

fn dynamic_to_json(value: Dynamic) -> Json {
    if value.is_unit() {
        return Json::Null;
    }
    if value.is::<bool>() {
        return Json::Bool(value.cast::<bool>());
    }
    if value.is::<INT>() {
        return Json::from(value.cast::<INT>());
    }
    if value.is::<FLOAT>() {
        return Number::from_f64(value.cast::<FLOAT>())
            .map(Json::Number)
            .unwrap_or(Json::Null);
    }
    if value.is::<ImmutableString>() {
        return Json::String(value.cast::<ImmutableString>().to_string());
    }
    if value.is::<char>() {
        return Json::String(value.cast::<char>().to_string());
    }
    if value.is::<Array>() {
        return Json::Array(value.cast::<Array>().into_iter().map(dynamic_to_json).collect());
    }
    if value.is::<Map>() {
        let map = value.cast::<Map>();
        return Json::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_string(), dynamic_to_json(value)))
                .collect(),
        );
    }
    Json::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn evaluator() -> RhaiEvaluator {
        RhaiEvaluator::default()
    }

    #[test]
    fn predicate_reads_values_map() {
        let evaluation = evaluator()
            .evaluate(
                &["values"],
                r#"values.country == "BR" && values["opt-in"]"#,
                vec![json!({"country": "BR", "opt-in": true})],
            )
            .expect("evaluation");
        assert_eq!(evaluation.value, json!(true));
    }

    #[test]
    fn top_level_return_yields_value() {
        let body = "if value.len() < 3 { return false; } true";
        let short = evaluator()
            .evaluate(&["value", "field"], body, vec![json!("ab"), json!({})])
            .expect("evaluation");
        assert_eq!(short.value, json!(false));

        let long = evaluator()
            .evaluate(&["value", "field"], body, vec![json!("abcd"), json!({})])
            .expect("evaluation");
        assert_eq!(long.value, json!(true));
    }

    #[test]
    fn parameter_mutations_are_reported() {
        let evaluation = evaluator()
            .evaluate(
                &["response", "field"],
                "field.value = response.address.city;",
                vec![
                    json!({"address": {"city": "Recife"}}),
                    json!({"id": "city", "value": ""}),
                ],
            )
            .expect("evaluation");
        let field = evaluation.binding("field").expect("field binding");
        assert_eq!(field["value"], json!("Recife"));
        assert_eq!(field["id"], json!("city"));
    }

    #[test]
    fn undeclared_variables_fail_to_compile() {
        let err = evaluator()
            .evaluate(&["values"], "window.location", vec![json!({})])
            .expect_err("strict variables");
        assert!(matches!(err, ExpressionError::Compile(_)));
    }

    #[test]
    fn runaway_scripts_hit_operation_limit() {
        let err = evaluator()
            .evaluate(&["field"], "loop { }", vec![json!({})])
            .expect_err("operation limit");
        assert!(matches!(err, ExpressionError::Runtime(_)));
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let err = evaluator()
            .evaluate(&["a", "b"], "a", vec![json!(1)])
            .expect_err("arity");
        assert_eq!(
            err,
            ExpressionError::Arity {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn numbers_round_trip() {
        let evaluation = evaluator()
            .evaluate(&["n"], "n * 2", vec![json!(21)])
            .expect("evaluation");
        assert_eq!(evaluation.value, json!(42));

        let evaluation = evaluator()
            .evaluate(&["n"], "n / 2.0", vec![json!(3)])
            .expect("evaluation");
        assert_eq!(evaluation.value, json!(1.5));
    }
}
