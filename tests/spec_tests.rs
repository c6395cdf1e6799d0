mod common;

use common::handlers::{dispatch, ok};
use http::Method;
use serde_json::{json, Value};
use specrouter::errors::ASSERTION_ERROR;
use specrouter::spec::{Param, ParameterLocation, Response};
use specrouter::{HandlerError, Router};

fn person_schema() -> Value {
    json!({
        "title": "Person",
        "key": "name",
        "properties": {
            "name": { "type": "string", "required": true, "maxLength": 40, "primaryKey": true },
            "born": { "type": "date" },
            "kind": { "type": "string", "enum": ["a", "b"], "maxLength": 1 },
            "updatedAt": { "type": "datetime" }
        }
    })
}

fn crud_router() -> Router {
    let mut router = Router::new();
    router.add_definition("person", &person_schema());
    router.add_definition(
        "EntityError",
        &json!({
            "type": "object",
            "title": "Entity",
            "description": "None",
            "properties": { "method": { "type": "string" } }
        }),
    );
    router.add_definition(
        "DatabaseError",
        &json!({
            "properties": {
                "name": { "type": "string" },
                "message": { "type": "string" },
                "details": { "type": "array", "items": { "type": "string" } }
            }
        }),
    );

    router
        .get("/modules/:p1/:p2", |_ctx, _state| {
            Box::pin(async { Ok(Some(json!(["none"]))) })
        })
        .unwrap()
        .params([Param::path("p1"), Param::path("p2")])
        .on_success([Response::new()
            .description("A list of available modules")
            .schema(json!({ "type": "array", "items": { "type": "string" } }))]);

    router
        .get("/person", ok)
        .unwrap()
        .summary("Summary")
        .description("Get person list")
        .params([
            Param::new("criteria").description("Filter, order and or pagination to apply"),
            Param::new("name"),
            Param::new("born").ty("date"),
        ])
        .on_success([Response::new().items("person")])
        .on_error([Response::new()
            .name("DatabaseError")
            .catch("EntityError")
            .catch("RequestError")
            .show(|err, _ctx| json!({ "name": "DatabaseError", "message": err.message, "details": [] }))]);

    router
        .get("/person/:name", ok)
        .unwrap()
        .params([Param::path("name").description("person to be find")])
        .on_success([Response::new().items("person")])
        .on_error([Response::new().schema_ref("EntityError")]);

    router
        .post("/person", ok)
        .unwrap()
        .params([Param::body("body")
            .description("person to be added")
            .required(true)
            .schema_ref("person")])
        .on_success([Response::new().name("person").status(201)])
        .on_error([Response::new().schema_ref("EntityError")]);

    router
        .delete("/person/:name", |_ctx, _state| Box::pin(async { Ok(None) }))
        .unwrap()
        .params([
            Param::path("name").description("Object id").ty("integer"),
            Param::body("updatedAt")
                .description("Last update timestamp")
                .required(true)
                .schema(json!({
                    "type": "object",
                    "properties": { "updatedAt": { "type": "string", "format": "date-time" } }
                })),
        ])
        .on_success([Response::new().status(204)])
        .on_error([Response::new().schema_ref("EntityError")]);

    router.get("/public", ok).unwrap().security(json!([]));

    router
        .get("/error410", |_ctx, _state| {
            Box::pin(async { Err(HandlerError::assertion("assertion")) })
        })
        .unwrap()
        .on_error([
            Response::new()
                .name(ASSERTION_ERROR)
                .schema(json!({ "properties": { "name": { "type": "string" } } }))
                .status(410)
                .show(|err, ctx| {
                    let suffix = if ctx.locals.contains_key("state") { "" } else { "-error" };
                    json!({ "message": format!("message is {}{}", err.message, suffix) })
                }),
            Response::new()
                .name(ASSERTION_ERROR)
                .schema(json!({ "properties": { "name": { "type": "string" } } }))
                .status(400)
                .show(|err, _ctx| json!({ "message": format!("message is {}", err.message) })),
        ]);

    router
}

#[test]
fn test_document_root() {
    let spec = crud_router().spec();
    assert_eq!(spec["swagger"], json!("2.0"));
    assert_eq!(spec["info"], json!({ "title": "Api", "version": "1.0.0" }));
    assert_eq!(
        spec["produces"],
        json!(["application/json", "text/plain; charset=utf-8"])
    );
    assert_eq!(spec["schemes"], json!(["https"]));
    assert_eq!(
        spec["securityDefinitions"],
        json!({ "internalApiKey": { "type": "apiKey", "name": "api_key", "in": "header" } })
    );
    assert!(spec.get("basePath").is_none());
}

#[test]
fn test_paths_use_brace_parameters() {
    let spec = crud_router().spec();
    let paths = spec["paths"].as_object().unwrap();
    assert!(paths.contains_key("/modules/{p1}/{p2}"));
    assert!(paths.contains_key("/person/{name}"));
    assert!(!paths.keys().any(|path| path.contains(':')));
    let methods: Vec<&String> = paths["/person/{name}"].as_object().unwrap().keys().collect();
    assert_eq!(methods, vec!["get", "delete"]);
}

#[test]
fn test_inline_success_schema() {
    let spec = crud_router().spec();
    assert_eq!(
        spec["paths"]["/modules/{p1}/{p2}"]["get"]["responses"]["200"],
        json!({
            "description": "A list of available modules",
            "schema": { "type": "array", "items": { "type": "string" } }
        })
    );
}

#[test]
fn test_list_operation() {
    let spec = crud_router().spec();
    let list = &spec["paths"]["/person"]["get"];
    assert_eq!(list["tags"], json!(["person"]));
    assert_eq!(list["summary"], json!("Summary"));
    assert_eq!(list["description"], json!("Get person list"));
    assert_eq!(list["security"], json!([{ "internalApiKey": [] }]));
    assert_eq!(
        list["responses"]["200"]["schema"],
        json!({ "type": "array", "items": { "$ref": "#/definitions/person" } })
    );
    assert_eq!(list["responses"]["400"], json!({ "description": "Error" }));
    assert_eq!(list["parameters"][2]["type"], json!("string"));
}

#[test]
fn test_default_summary() {
    let spec = crud_router().spec();
    assert_eq!(
        spec["paths"]["/person/{name}"]["get"]["summary"],
        json!("Get Person")
    );
    assert_eq!(
        spec["paths"]["/person/{name}"]["delete"]["summary"],
        json!("Delete Person")
    );
}

#[test]
fn test_path_params_always_required() {
    let spec = crud_router().spec();
    let params = &spec["paths"]["/person/{name}"]["get"]["parameters"];
    assert_eq!(
        params[0],
        json!({
            "in": "path",
            "name": "name",
            "description": "person to be find",
            "required": true,
            "type": "string"
        })
    );
}

#[test]
fn test_body_parameter() {
    let router = crud_router();
    let spec = router.spec();
    assert_eq!(
        spec["paths"]["/person"]["post"]["parameters"][0],
        json!({
            "in": "body",
            "name": "body",
            "description": "person to be added",
            "required": true,
            "schema": { "$ref": "#/definitions/person" }
        })
    );
    let matched = router.find_service(&Method::POST, "/person").unwrap();
    assert!(matched.service.spec().body_requested());
    let matched = router.find_service(&Method::GET, "/person").unwrap();
    assert!(!matched.service.spec().body_requested());
}

#[test]
fn test_custom_success_status() {
    let spec = crud_router().spec();
    let responses = spec["paths"]["/person"]["post"]["responses"]
        .as_object()
        .unwrap();
    let statuses: Vec<&String> = responses.keys().collect();
    assert_eq!(statuses, vec!["201", "400"]);
    assert_eq!(
        responses["400"],
        json!({ "schema": { "$ref": "#/definitions/EntityError" }, "description": "Error" })
    );
}

#[test]
fn test_public_route_has_no_security() {
    let spec = crud_router().spec();
    assert_eq!(spec["paths"]["/public"]["get"]["security"], json!([]));
}

#[test]
fn test_inline_error_schemas_registered() {
    let spec = crud_router().spec();
    assert_eq!(
        spec["definitions"][ASSERTION_ERROR],
        json!({ "properties": { "name": { "type": "string" } } })
    );
    let responses = &spec["paths"]["/error410"]["get"]["responses"];
    assert_eq!(
        responses["410"]["schema"],
        json!({ "$ref": "#/definitions/AssertionError" })
    );
    assert_eq!(
        responses["400"]["schema"],
        json!({ "$ref": "#/definitions/AssertionError" })
    );
}

#[test]
fn test_definitions_normalized() {
    let spec = crud_router().spec();
    assert_eq!(
        spec["definitions"]["person"],
        json!({
            "title": "Person",
            "x-key": "name",
            "properties": {
                "name": { "type": "string", "maxLength": 40, "x-primaryKey": true },
                "born": { "type": "string", "format": "date" },
                "kind": { "type": "string", "enum": ["a", "b"] },
                "updatedAt": { "type": "string", "format": "datetime" }
            },
            "required": ["name"]
        })
    );
    assert_eq!(
        spec["definitions"]["EntityError"],
        json!({
            "type": "object",
            "title": "Entity",
            "description": "None",
            "properties": { "method": { "type": "string" } }
        })
    );
}

#[test]
fn test_parameter_locations() {
    assert_eq!(ParameterLocation::FormData.to_string(), "formData");
    assert_eq!(ParameterLocation::default(), ParameterLocation::Query);
    assert_eq!(
        Param::new("x").location(ParameterLocation::Cookie).to_spec()["in"],
        json!("cookie")
    );
}

#[test]
fn test_get_returns_snapshots() {
    let mut router = Router::new();
    let before = router.spec();
    router.get("/later", ok).unwrap();
    assert!(before["paths"].get("/later").is_none());
    assert!(router.spec()["paths"].get("/later").is_some());
}

#[test]
fn test_set_base_path() {
    let router = Router::new();
    router.set_base_path("/api/v1");
    assert_eq!(router.spec()["basePath"], json!("/api/v1"));
}

#[test]
fn test_definition_overwritten() {
    let router = Router::new();
    router.add_definition("Thing", &json!({ "title": "first" }));
    router.add_definition("Thing", &json!({ "title": "second" }));
    assert_eq!(router.definition("Thing"), Some(json!({ "title": "second" })));
}

#[tokio::test]
async fn test_error400_uses_response_name() {
    let mut router = crud_router();
    router
        .get("/error400", |_ctx, _state| {
            Box::pin(async { Err(HandlerError::assertion("assertion")) })
        })
        .unwrap()
        .on_error([Response::new().name(ASSERTION_ERROR).schema_ref("other")]);

    let (_, state) = dispatch(&router, Method::GET, "/error400").await.unwrap();
    assert_eq!(state.status, Some(400));
    assert_eq!(state.error, Some(json!({ "message": "assertion" })));
}

#[tokio::test]
async fn test_error410_first_rule_wins() {
    let router = crud_router();
    let (_, state) = dispatch(&router, Method::GET, "/error410").await.unwrap();
    assert_eq!(state.status, Some(410));
    assert_eq!(
        state.error,
        Some(json!({ "message": "message is assertion-error" }))
    );
}

#[tokio::test]
async fn test_list_error_catches_listed_names() {
    let mut router = Router::new();
    router
        .get("/fails", |_ctx, _state| {
            Box::pin(async { Err(HandlerError::new("RequestErrorTimeout", "slow")) })
        })
        .unwrap()
        .on_error([Response::new()
            .name("DatabaseError")
            .catch("EntityError")
            .catch("RequestError")]);

    let (_, state) = dispatch(&router, Method::GET, "/fails").await.unwrap();
    assert_eq!(state.status, Some(400));
    assert_eq!(state.error, Some(json!({ "message": "slow" })));
}

#[tokio::test]
async fn test_get_a_definition() {
    let router = crud_router();
    let (body, state) = dispatch(&router, Method::GET, "/spec?definition=DatabaseError")
        .await
        .unwrap();
    assert_eq!(state.status, Some(200));
    assert_eq!(body.unwrap()["properties"]["name"]["type"], json!("string"));
}

#[test]
fn test_spec_route_documented() {
    let spec = Router::new().spec();
    let operation = &spec["paths"]["/spec"]["get"];
    assert_eq!(
        operation["parameters"],
        json!([{
            "in": "query",
            "name": "definition",
            "description": "Fetch only the requested definition",
            "required": false,
            "type": "string"
        }])
    );
    assert_eq!(
        operation["responses"]["200"],
        json!({ "description": "A swagger specification or definition" })
    );
}
