use json_selector::{select, select_paths, JsonSelector, JsonSelectorOptions, JsonValue};
use serde_json::{json, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn eval_values(path: &str, data: &Value) -> Vec<Value> {
    init_logging();
    select(data, path, &JsonSelectorOptions::default())
        .unwrap_or_else(|e| panic!("select failed for '{path}': {e}"))
        .iter()
        .map(JsonValue::to_value)
        .collect()
}

fn eval_paths(path: &str, data: &Value) -> Vec<String> {
    init_logging();
    select_paths(data, path, &JsonSelectorOptions::default())
        .unwrap_or_else(|e| panic!("select_paths failed for '{path}': {e}"))
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn store() -> Value {
    json!({
        "store": {
            "book": [
                {"category": "reference", "author": "Nigel Rees", "title": "Sayings of the Century", "price": 8.95},
                {"category": "fiction", "author": "Evelyn Waugh", "title": "Sword of Honour", "price": 12.99},
                {"category": "fiction", "author": "Herman Melville", "title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99},
                {"category": "fiction", "author": "J. R. R. Tolkien", "title": "The Lord of the Rings", "isbn": "0-395-19395-8", "price": 22.99}
            ],
            "bicycle": {"color": "red", "price": 19.95}
        },
        "expensive": 10
    })
}

#[test]
fn exec_names_and_wildcards_matrix() {
    let data = store();
    let authors = vec![
        json!("Nigel Rees"),
        json!("Evelyn Waugh"),
        json!("Herman Melville"),
        json!("J. R. R. Tolkien"),
    ];
    assert_eq!(eval_values("$.store.book[*].author", &data), authors);
    assert_eq!(eval_values("$..author", &data), authors);
    assert_eq!(eval_values("$['store']['book'][*]['author']", &data), authors);
    assert_eq!(eval_values("$.store.*", &data).len(), 2);
    assert_eq!(eval_values("$", &data), vec![data.clone()]);
    assert!(eval_values("$.expensive.*", &data).is_empty());
    assert!(eval_values("$.missing.path", &data).is_empty());
}

#[test]
fn exec_recursive_descent_matrix() {
    let data = store();
    assert_eq!(
        eval_values("$.store..price", &data),
        vec![json!(8.95), json!(12.99), json!(8.99), json!(22.99), json!(19.95)]
    );
    assert_eq!(eval_values("$..book[2].title", &data), vec![json!("Moby Dick")]);
    assert_eq!(eval_values("$..[?(@.color)].color", &data), vec![json!("red")]);
    assert_eq!(eval_values("$..*", &data), eval_values("$..[*]", &data));
}

#[test]
fn exec_index_slice_union_matrix() {
    let data = store();
    assert_eq!(eval_values("$..book[-1].title", &data), vec![json!("The Lord of the Rings")]);
    assert_eq!(
        eval_values("$..book[0,1].title", &data),
        vec![json!("Sayings of the Century"), json!("Sword of Honour")]
    );
    assert_eq!(eval_values("$..book[:2].title", &data), eval_values("$..book[0,1].title", &data));
    assert_eq!(
        eval_values("$.store.book[-2:].title", &data),
        vec![json!("Moby Dick"), json!("The Lord of the Rings")]
    );
    assert_eq!(
        eval_values("$.store.book[::2].title", &data),
        vec![json!("Sayings of the Century"), json!("Moby Dick")]
    );
    assert_eq!(
        eval_values("$.store.book[::-1].author", &data),
        vec![
            json!("J. R. R. Tolkien"),
            json!("Herman Melville"),
            json!("Evelyn Waugh"),
            json!("Nigel Rees")
        ]
    );
    assert_eq!(
        eval_values("$['store']['bicycle']['color','price']", &data),
        vec![json!("red"), json!(19.95)]
    );
    assert!(eval_values("$.store.book[4]", &data).is_empty());
    assert!(eval_values("$.store.book[-5]", &data).is_empty());
    assert_eq!(eval_values("$.store.book[1:4:2].price", &data), vec![json!(12.99), json!(22.99)]);
}

#[test]
fn exec_slice_extreme_step_matrix() {
    let data = json!([1, 2, 3]);
    assert_eq!(eval_values("$[1::9223372036854775807]", &data), vec![json!(2)]);
    assert_eq!(eval_values("$[1::-9223372036854775808]", &data), vec![json!(2)]);
    assert_eq!(eval_values("$[::9223372036854775807]", &data), vec![json!(1)]);
}

#[test]
fn exec_length_property_matrix() {
    let data = json!({"a": [1, 2, 3], "s": "h\u{e9}llo", "o": {"length": 7}});
    assert_eq!(eval_values("$.a.length", &data), vec![json!(3)]);
    assert_eq!(eval_values("$.s.length", &data), vec![json!(5)]);
    assert_eq!(eval_values("$.o.length", &data), vec![json!(7)]);
    assert_eq!(
        eval_values("$[?(@.length > 2)]", &data),
        vec![json!([1, 2, 3]), json!("h\u{e9}llo"), json!({"length": 7})]
    );
    assert!(eval_values("$.a[0].length", &data).is_empty());
}

#[test]
fn exec_paths_matrix() {
    let data = store();
    assert_eq!(
        eval_paths("$..book[?(@.isbn)]", &data),
        vec!["$['store']['book'][2]", "$['store']['book'][3]"]
    );
    assert_eq!(eval_paths("$", &data), vec!["$"]);
    assert_eq!(eval_paths("$.store.bicycle.*", &data), vec![
        "$['store']['bicycle']['color']",
        "$['store']['bicycle']['price']"
    ]);
    let data = json!({"it's": {"a\\b": 1}});
    assert_eq!(eval_paths("$..*", &data), vec!["$['it\\'s']", "$['it\\'s']['a\\\\b']"]);
}

#[test]
fn exec_parent_matrix() {
    let data = store();
    assert_eq!(
        eval_values("$.store.book[?(@.price > 20)].title^.author", &data),
        vec![json!("J. R. R. Tolkien")]
    );
    assert_eq!(eval_values("$.store.book[?(@^.length > 3)]", &data).len(), 4);
    assert_eq!(eval_paths("$.store.bicycle.color^^", &data), vec!["$['store']"]);
    assert!(eval_values("$^", &data).is_empty());
}

#[test]
fn exec_current_node_anchor_matrix() {
    let data = json!({"a": {"b": 1}});
    assert_eq!(eval_values("@.a.b", &data), vec![json!(1)]);
    assert_eq!(eval_values("$[@.a]", &data), vec![json!({"b": 1})]);
}

#[test]
fn exec_compiled_selector_is_reusable() {
    let selector = JsonSelector::parse("$[*].id").unwrap();
    let options = JsonSelectorOptions::default();
    let first = json!([{"id": 1}, {"id": 2}]);
    let second = json!([{"id": "x"}]);
    assert_eq!(selector.select(&first, &options).unwrap().len(), 2);
    let values = selector.select(&second, &options).unwrap();
    assert_eq!(values[0].to_value(), json!("x"));
    assert_eq!(values[0].as_value(), Some(&second[0]["id"]));
}
