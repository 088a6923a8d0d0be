//! OpenAPI fragment for the Books module. Paths are relative to the mount
//! point; the HTTP layer prefixes them with `/api/books`.

use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_content(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}

fn book_ref() -> Value {
    json!({ "$ref": "#/components/schemas/Book" })
}

fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn collection_path() -> Value {
    let list = json!({
        "summary": "List books",
        "tags": ["Books"],
        "parameters": [{
            "name": "category",
            "in": "query",
            "required": false,
            "description": "Exact, case-sensitive category filter",
            "schema": { "type": "string" }
        }],
        "responses": {
            "200": {
                "description": "List of books",
                "content": json_content(json!({ "type": "array", "items": book_ref() }))
            },
            "500": error_response("Internal server error")
        }
    });

    let create = json!({
        "summary": "Create a book",
        "tags": ["Books"],
        "requestBody": {
            "required": true,
            "content": json_content(json!({ "$ref": "#/components/schemas/NewBook" }))
        },
        "responses": {
            "201": {
                "description": "Book created",
                "content": json_content(json!({ "$ref": "#/components/schemas/CreatedBook" }))
            },
            "400": error_response("Invalid payload"),
            "500": error_response("Internal server error")
        }
    });

    json!({ "get": list, "post": create })
}

fn item_path() -> Value {
    let get = json!({
        "summary": "Get a book",
        "tags": ["Books"],
        "parameters": [id_parameter()],
        "responses": {
            "200": { "description": "The book", "content": json_content(book_ref()) },
            "404": error_response("Book not found"),
            "500": error_response("Internal server error")
        }
    });

    let put = json!({
        "summary": "Merge fields into a book",
        "tags": ["Books"],
        "parameters": [id_parameter()],
        "requestBody": {
            "required": true,
            "content": json_content(json!({ "type": "object" }))
        },
        "responses": {
            "200": { "description": "The updated book", "content": json_content(book_ref()) },
            "400": error_response("Invalid payload"),
            "404": error_response("Book not found"),
            "500": error_response("Internal server error")
        }
    });

    let delete = json!({
        "summary": "Delete a book",
        "tags": ["Books"],
        "parameters": [id_parameter()],
        "responses": {
            "204": { "description": "Deleted, or already absent" },
            "500": error_response("Internal server error")
        }
    });

    json!({ "get": get, "put": put, "delete": delete })
}

fn schemas() -> Value {
    let content_properties = json!({
        "title": { "type": "string" },
        "author": { "type": "string" },
        "category": { "type": "string" },
        "price": { "type": "number" }
    });

    let mut book_properties = content_properties.clone();
    book_properties["id"] = json!({ "type": "string", "description": "Server-assigned identifier" });
    book_properties["createdAt"] = json!({ "type": "string", "format": "date-time" });
    book_properties["updatedAt"] = json!({ "type": "string", "format": "date-time" });

    json!({
        "Book": {
            "type": "object",
            "properties": book_properties,
            "additionalProperties": true,
            "required": ["id"]
        },
        "NewBook": {
            "type": "object",
            "properties": content_properties,
            "additionalProperties": true,
            "required": ["title", "author", "category"]
        },
        "CreatedBook": {
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"]
        }
    })
}

pub fn document() -> Value {
    json!({
        "paths": {
            "/": collection_path(),
            "/{id}": item_path()
        },
        "components": { "schemas": schemas() }
    })
}
