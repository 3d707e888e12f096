//! End-to-end scenarios covering create/insert/select with filters,
//! multi-way joins, aggregations and ambiguous column references, run
//! against `Database::create_in_memory`.

use pauldb::{Database, StatementResult, Value};

fn rows(results: Vec<StatementResult>) -> Vec<pauldb_expr::Row> {
    match results.into_iter().last() {
        Some(StatementResult::Rows(rows)) => rows,
        _ => panic!("expected the last statement to return rows"),
    }
}

#[test]
fn create_insert_select_with_where_order_by_limit() {
    let mut db = Database::create_in_memory();
    db.execute("CREATE TABLE points (x FLOAT, y FLOAT, color TEXT)").unwrap();
    db.execute(
        "INSERT INTO points (x, y, color) VALUES (1.0, 2.0, 'green')",
    )
    .unwrap();
    db.execute("INSERT INTO points (x, y, color) VALUES (3.0, 4.0, 'blue')").unwrap();
    db.execute("INSERT INTO points (x, y, color) VALUES (5.0, 6.0, 'red')").unwrap();

    let result = rows(db.execute("SELECT * FROM points WHERE color = 'green'").unwrap());
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].get("color"), Some(&Value::String("green".to_string())));

    let result = rows(
        db.execute("SELECT * FROM points WHERE x <= 3.5 AND color < 'green' OR y < 3.0")
            .unwrap(),
    );
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].get("color"), Some(&Value::String("green".to_string())));
    assert_eq!(result[1].get("color"), Some(&Value::String("blue".to_string())));

    let result = rows(
        db.execute("SELECT x as pointx FROM points WHERE x <= 3.5 AND color < 'green' OR y < 3.0")
            .unwrap(),
    );
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].get("pointx"), Some(&Value::Float(1.0)));
    assert_eq!(result[1].get("pointx"), Some(&Value::Float(3.0)));

    let result = rows(
        db.execute("SELECT color FROM points WHERE x > 1 ORDER BY x DESC LIMIT 1")
            .unwrap(),
    );
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].get("color"), Some(&Value::String("red".to_string())));
}

#[test]
fn two_way_join_across_three_tables() {
    let mut db = Database::create_in_memory();
    db.execute("CREATE TABLE cats (id INT, name TEXT, age INT)").unwrap();
    db.execute("CREATE TABLE humans (id INT, name TEXT)").unwrap();
    db.execute("CREATE TABLE cat_owners (cat_id INT, human_id INT)").unwrap();

    db.execute("INSERT INTO cats (id, name, age) VALUES (1, 'fluffy', 3)").unwrap();
    db.execute("INSERT INTO cats (id, name, age) VALUES (2, 'mittens', 5)").unwrap();
    db.execute("INSERT INTO humans (id, name) VALUES (1, 'alice')").unwrap();
    db.execute("INSERT INTO humans (id, name) VALUES (2, 'bob')").unwrap();
    db.execute("INSERT INTO cat_owners (cat_id, human_id) VALUES (1, 1)").unwrap();
    db.execute("INSERT INTO cat_owners (cat_id, human_id) VALUES (2, 2)").unwrap();
    db.execute("INSERT INTO cat_owners (cat_id, human_id) VALUES (2, 1)").unwrap();

    let result = rows(db.execute(
        "SELECT cats.name as cat, humans.name as owner FROM cats \
         JOIN cat_owners ON cats.id = cat_owners.cat_id \
         JOIN humans ON humans.id = cat_owners.human_id",
    ).unwrap());

    let pairs: Vec<(String, String)> = result
        .iter()
        .map(|row| {
            let cat = match row.get("cat").unwrap() {
                Value::String(s) => s.clone(),
                _ => panic!("expected string"),
            };
            let owner = match row.get("owner").unwrap() {
                Value::String(s) => s.clone(),
                _ => panic!("expected string"),
            };
            (cat, owner)
        })
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("fluffy".to_string(), "alice".to_string()),
            ("mittens".to_string(), "bob".to_string()),
            ("mittens".to_string(), "alice".to_string()),
        ]
    );
}

#[test]
fn aggregations_over_cats() {
    let mut db = Database::create_in_memory();
    db.execute("CREATE TABLE cats (id INT, name TEXT, age INT)").unwrap();
    db.execute("INSERT INTO cats (id, name, age) VALUES (1, 'fluffy', 3)").unwrap();
    db.execute("INSERT INTO cats (id, name, age) VALUES (2, 'mittens', 5)").unwrap();

    let result = rows(db.execute("SELECT MAX(age) as max_age FROM cats").unwrap());
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].get("max_age"), Some(&Value::Int32(5)));

    let result = rows(db.execute("SELECT COUNT(*) as num_cats FROM cats").unwrap());
    assert_eq!(result[0].get("num_cats"), Some(&Value::Uint32(2)));

    let result = rows(db.execute("SELECT ARRAY_AGG(name) as names FROM cats").unwrap());
    assert_eq!(
        result[0].get("names"),
        Some(&Value::Array(vec![
            Value::String("fluffy".to_string()),
            Value::String("mittens".to_string()),
        ]))
    );
}

#[test]
fn ambiguous_unqualified_column_ref_errors() {
    let mut db = Database::create_in_memory();
    db.execute("CREATE TABLE cats (id INT, name TEXT)").unwrap();
    db.execute("CREATE TABLE humans (id INT, name TEXT)").unwrap();
    db.execute("INSERT INTO cats (id, name) VALUES (1, 'fluffy')").unwrap();
    db.execute("INSERT INTO humans (id, name) VALUES (1, 'alice')").unwrap();

    let err = db
        .execute("SELECT name FROM cats JOIN humans ON cats.id = humans.id")
        .unwrap_err();
    assert!(err.to_string().contains("Ambiguous"));
}
