use std::sync::Arc;

use futures::StreamExt;
use futures::executor::block_on;
use kestrel_core::arrays::array::Array;
use kestrel_core::arrays::array::physical_type::{PhysicalF64, PhysicalUtf8};
use kestrel_core::arrays::batch::Batch;
use kestrel_core::arrays::datatype::DataType;
use kestrel_core::arrays::field::{Field, Schema};
use kestrel_core::arrays::scalar::ScalarValue;
use kestrel_core::bound::*;
use kestrel_core::engine::Engine;
use kestrel_core::execution::context::CancellationToken;
use kestrel_core::storage::MemoryTableSource;
use kestrel_error::ErrorKind;

fn engine() -> Engine {
    logutil::init_test();
    let mut engine = Engine::new();
    engine.config_mut().verify_chunks = true;
    engine
}

fn run_with(engine: &Engine, statements: Vec<BoundStatement>) -> String {
    engine
        .evaluate(&BoundScript::new(statements))
        .unwrap()
        .dump_to_string()
        .unwrap()
}

fn assert_output(expected: &str, statements: Vec<BoundStatement>) {
    let got = run_with(&engine(), statements);
    assert_eq!(expected.trim(), got.trim(), "got:\n{got}");
}

fn query(query: BoundQuery) -> Vec<BoundStatement> {
    vec![BoundStatement::Query(query)]
}

fn longs(values: &[i64]) -> Vec<ScalarValue> {
    values.iter().map(|v| ScalarValue::from(*v)).collect()
}

fn counters() -> BoundQuery {
    datatable(
        &[
            ("AppMachine", DataType::Utf8),
            ("CounterName", DataType::Utf8),
            ("CounterValue", DataType::Float64),
        ],
        vec![
            "vm0".into(),
            "cpu".into(),
            50_i64.into(),
            "vm0".into(),
            "mem".into(),
            30_i64.into(),
            "vm1".into(),
            "cpu".into(),
            20_i64.into(),
        ],
    )
    .unwrap()
}

#[test]
fn print_unnamed() {
    assert_output(
        "
print_0:long
------------------
1
",
        query(print(vec![unnamed(lit(1_i64))])),
    );
}

#[test]
fn print_mixed_names() {
    assert_output(
        "
a:long; b:long; print_2:long
------------------
3; 1; 2
",
        query(print(vec![
            named("a", lit(3_i64)),
            named("b", lit(1_i64)),
            unnamed(lit(2_i64)),
        ])),
    );
}

#[test]
fn unary_minus() {
    assert_output(
        "
a:long; b:real
------------------
-1; -2
",
        query(print(vec![
            named("a", unary(UnaryOp::Negate, lit(1_i64))),
            named(
                "b",
                binary(BinaryOp::Add, lit(1_i64), unary(UnaryOp::Negate, lit(3.0))),
            ),
        ])),
    );
}

#[test]
fn scalar_script() {
    let engine = engine();
    let result = engine
        .evaluate(&BoundScript::new(vec![
            let_expr("x", lit(2_i64)),
            BoundStatement::Expr(binary(BinaryOp::Multiply, var("x"), lit(21_i64))),
        ]))
        .unwrap();
    assert_eq!(Some(ScalarValue::from(42_i64)), result.into_scalar());
}

#[test]
fn simple_datatable() {
    assert_output(
        "
AppMachine:string; CounterName:string; CounterValue:real
------------------
vm0; cpu; 50
vm0; mem; 30
vm1; cpu; 20
",
        query(counters()),
    );
}

#[test]
fn project_names_generated_columns() {
    assert_output(
        "
AppMachine:string; plus1:long; Column1:long
------------------
vm0; 2; 2
vm0; 2; 2
vm1; 2; 2
",
        query(counters().pipe(BoundOperator::Project(vec![
            unnamed(col("AppMachine")),
            named("plus1", binary(BinaryOp::Add, lit(1_i64), lit(1_i64))),
            unnamed(binary(BinaryOp::Add, lit(1_i64), lit(1_i64))),
        ]))),
    );
}

#[test]
fn project_columnizes_scalar() {
    assert_output(
        "
a:long; b:long
------------------
1; 1
2; 1
",
        query(
            datatable(&[("a", DataType::Int64)], longs(&[1, 2]))
                .unwrap()
                .pipe(BoundOperator::Project(vec![
                    unnamed(col("a")),
                    named("b", lit(1_i64)),
                ])),
        ),
    );
}

#[test]
fn where_filters_rows() {
    assert_output(
        "
AppMachine:string; CounterName:string; CounterValue:real
------------------
vm0; cpu; 50
vm1; cpu; 20
",
        query(counters().pipe(BoundOperator::Where(binary(
            BinaryOp::Equal,
            col("CounterName"),
            lit("cpu"),
        )))),
    );
}

#[test]
fn extend_and_project_away() {
    assert_output(
        "
AppMachine:string; doubled:real
------------------
vm0; 100
vm0; 60
vm1; 40
",
        query(
            counters()
                .pipe(BoundOperator::Extend(vec![named(
                    "doubled",
                    binary(BinaryOp::Multiply, col("CounterValue"), lit(2_i64)),
                )]))
                .pipe(BoundOperator::ProjectAway(vec![
                    "CounterName".to_string(),
                    "CounterValue".to_string(),
                ])),
        ),
    );
}

#[test]
fn project_rename() {
    assert_output(
        "
machine:string; CounterName:string; CounterValue:real
------------------
vm0; cpu; 50
vm0; mem; 30
vm1; cpu; 20
",
        query(counters().pipe(BoundOperator::ProjectRename(vec![(
            "machine".to_string(),
            "AppMachine".to_string(),
        )]))),
    );
}

#[test]
fn summarize_by_bin() {
    assert_output(
        "
a:long; count_:long
------------------
0; 1
2; 2
",
        vec![
            let_query(
                "input",
                datatable(&[("a", DataType::Int64)], longs(&[1, 2, 3])).unwrap(),
            ),
            BoundStatement::Query(table("input").pipe(BoundOperator::Summarize {
                aggregates: vec![unnamed(call("count", vec![]))],
                by: vec![unnamed(call("bin", vec![col("a"), lit(2_i64)]))],
            })),
        ],
    );
}

#[test]
fn summarize_without_groups() {
    assert_output(
        "
count_:long
------------------
3
",
        query(counters().pipe(BoundOperator::Summarize {
            aggregates: vec![unnamed(call("count", vec![]))],
            by: vec![],
        })),
    );
}

#[test]
fn summarize_several_aggregates() {
    let input = datatable(
        &[
            ("AppMachine", DataType::Utf8),
            ("CounterName", DataType::Utf8),
            ("CounterValue", DataType::Float64),
        ],
        vec![
            "vm0".into(),
            "cpu".into(),
            43_i64.into(),
            "vm0".into(),
            "mem".into(),
            30_i64.into(),
            "vm1".into(),
            "cpu".into(),
            20_i64.into(),
        ],
    )
    .unwrap();
    assert_output(
        "
vAvg:real; vCount:long; vSum:real
------------------
31; 3; 93
",
        query(input.pipe(BoundOperator::Summarize {
            aggregates: vec![
                named("vAvg", call("avg", vec![col("CounterValue")])),
                named("vCount", call("count", vec![])),
                named("vSum", call("sum", vec![col("CounterValue")])),
            ],
            by: vec![],
        })),
    );
}

#[test]
fn aggregate_inside_expression() {
    assert_output(
        "
v:long
------------------
300
",
        query(
            datatable(&[("a", DataType::Int64)], longs(&[1, 2, 3]))
                .unwrap()
                .pipe(BoundOperator::Summarize {
                    aggregates: vec![named(
                        "v",
                        binary(BinaryOp::Multiply, lit(100_i64), call("count", vec![])),
                    )],
                    by: vec![],
                }),
        ),
    );
}

fn sortable() -> BoundQuery {
    datatable(
        &[("a", DataType::Int64), ("b", DataType::Int32)],
        vec![
            3_i64.into(),
            9_i64.into(),
            2_i64.into(),
            8_i64.into(),
            1_i64.into(),
            7_i64.into(),
            ScalarValue::Int64(None),
            42_i64.into(),
            4_i64.into(),
            6_i64.into(),
        ],
    )
    .unwrap()
}

fn reals() -> BoundQuery {
    datatable(
        &[("a", DataType::Float64)],
        vec![1.5.into(), 1_i64.into(), ScalarValue::Float64(None), 3_i64.into()],
    )
    .unwrap()
}

#[test]
fn sort_defaults_to_descending_nulls_last() {
    assert_output(
        "
a:long; b:int
------------------
4; 6
3; 9
2; 8
1; 7
(null); 42
",
        query(sortable().pipe(BoundOperator::Sort(vec![sort_key(col("a"), None, None)]))),
    );
}

#[test]
fn sort_descending_nulls_first() {
    assert_output(
        "
a:long; b:int
------------------
(null); 42
4; 6
3; 9
2; 8
1; 7
",
        query(sortable().pipe(BoundOperator::Sort(vec![sort_key(
            col("a"),
            None,
            Some(NullsOrder::First),
        )]))),
    );
}

#[test]
fn sort_ascending_nulls_first_by_default() {
    assert_output(
        "
a:real
------------------
(null)
1
1.5
3
",
        query(reals().pipe(BoundOperator::Sort(vec![sort_key(
            col("a"),
            Some(SortOrder::Ascending),
            None,
        )]))),
    );
}

#[test]
fn sort_ascending_nulls_last() {
    assert_output(
        "
a:real
------------------
1
1.5
3
(null)
",
        query(reals().pipe(BoundOperator::Sort(vec![sort_key(
            col("a"),
            Some(SortOrder::Ascending),
            Some(NullsOrder::Last),
        )]))),
    );
}

#[test]
fn take_rows() {
    assert_output(
        "
v:real
------------------
1
2
3
",
        query(
            datatable(&[("v", DataType::Float64)], longs(&[1, 2, 3, 4, 5]))
                .unwrap()
                .pipe(BoundOperator::Take(3)),
        ),
    );
}

#[test]
fn count_after_take() {
    assert_output(
        "
Count:long
------------------
2
",
        query(
            counters()
                .pipe(BoundOperator::Take(2))
                .pipe(BoundOperator::Count { name: None }),
        ),
    );
}

#[test]
fn count_with_name() {
    assert_output(
        "
abc:long
------------------
3
",
        query(counters().pipe(BoundOperator::Count {
            name: Some("abc".to_string()),
        })),
    );
}

#[test]
fn distinct_columns() {
    assert_output(
        "
AppMachine:string
------------------
vm0
vm1
",
        query(counters().pipe(BoundOperator::Distinct(DistinctColumns::Columns(vec![
            "AppMachine".to_string(),
        ])))),
    );
    assert_output(
        "
AppMachine:string; CounterName:string
------------------
vm0; cpu
vm0; mem
vm1; cpu
",
        query(counters().pipe(BoundOperator::Distinct(DistinctColumns::Columns(vec![
            "AppMachine".to_string(),
            "CounterName".to_string(),
        ])))),
    );
}

#[test]
fn distinct_star() {
    let input = datatable(
        &[("AppMachine", DataType::Utf8), ("CounterName", DataType::Utf8)],
        vec![
            "vm0".into(),
            "cpu".into(),
            "vm1".into(),
            "cpu".into(),
            "vm0".into(),
            "cpu".into(),
            "vm0".into(),
            "mem".into(),
        ],
    )
    .unwrap();
    assert_output(
        "
AppMachine:string; CounterName:string
------------------
vm0; cpu
vm1; cpu
vm0; mem
",
        query(input.pipe(BoundOperator::Distinct(DistinctColumns::All))),
    );
}

fn reals_named(name: &str, values: &[i64]) -> BoundQuery {
    datatable(&[(name, DataType::Float64)], longs(values)).unwrap()
}

#[test]
fn union_with_left_input() {
    assert_output(
        "
v:real
------------------
1
2
1
2
",
        vec![
            let_query("input", reals_named("v", &[1, 2])),
            BoundStatement::Query(table("input").pipe(BoundOperator::Union(vec![table("input")]))),
        ],
    );
}

#[test]
fn union_without_left_input() {
    assert_output(
        "
v:real
------------------
1
2
3
4
",
        query(BoundQuery::Union(vec![
            reals_named("v", &[1, 2]),
            reals_named("v", &[3, 4]),
        ])),
    );
}

#[test]
fn union_disjoint_schemas() {
    assert_output(
        "
v1:real; v2:real
------------------
1; (null)
2; (null)
(null); 3
(null); 4
",
        query(BoundQuery::Union(vec![
            reals_named("v1", &[1, 2]),
            reals_named("v2", &[3, 4]),
        ])),
    );
}

#[test]
fn union_conflicting_kinds() {
    assert_output(
        "
v_real:real; v_real1:real; v_long:long
------------------
1; (null); (null)
2; (null); (null)
(null); 3; (null)
(null); 4; (null)
(null); (null); 5
(null); (null); 6
7; (null); (null)
",
        query(BoundQuery::Union(vec![
            reals_named("v_real", &[1, 2]),
            reals_named("v", &[3, 4]),
            datatable(&[("v", DataType::Int64)], longs(&[5, 6])).unwrap(),
            reals_named("v_real", &[7]),
        ])),
    );
}

#[test]
fn user_function_scalar() {
    assert_output(
        "
v:long
------------------
3
4
5
",
        vec![
            let_function(
                "f",
                vec![scalar_param("a", DataType::Int64)],
                vec![BoundStatement::Expr(binary(BinaryOp::Add, var("a"), lit(1_i64)))],
            ),
            BoundStatement::Query(
                datatable(&[("v", DataType::Int64)], longs(&[1, 2, 3]))
                    .unwrap()
                    .pipe(BoundOperator::Project(vec![named(
                        "v",
                        user_call(
                            "f",
                            vec![BoundArg::Expr(binary(BinaryOp::Add, col("v"), lit(1_i64)))],
                        ),
                    )])),
            ),
        ],
    );
}

#[test]
fn user_function_tabular() {
    assert_output(
        "
v:long
------------------
1
2
3
",
        vec![
            let_function(
                "f",
                vec![tabular_param("t")],
                vec![BoundStatement::Query(
                    table("t").pipe(BoundOperator::Project(vec![unnamed(col("v"))])),
                )],
            ),
            BoundStatement::Query(BoundQuery::UserCall {
                name: "f".to_string(),
                args: vec![BoundArg::Query(
                    datatable(&[("v", DataType::Int64)], longs(&[1, 2, 3])).unwrap(),
                )],
            }),
        ],
    );
}

#[test]
fn user_function_tabular_and_scalar() {
    assert_output(
        "
v:long
------------------
2
3
4
",
        vec![
            let_function(
                "f",
                vec![tabular_param("t"), scalar_param("c", DataType::Int64)],
                vec![BoundStatement::Query(table("t").pipe(BoundOperator::Project(vec![
                    named("v", binary(BinaryOp::Add, col("v"), var("c"))),
                ])))],
            ),
            BoundStatement::Query(BoundQuery::UserCall {
                name: "f".to_string(),
                args: vec![
                    BoundArg::Query(datatable(&[("v", DataType::Int64)], longs(&[1, 2, 3])).unwrap()),
                    BoundArg::Expr(lit(1_i64)),
                ],
            }),
        ],
    );
}

#[test]
fn user_function_casts_argument() {
    assert_output(
        "
v:real
------------------
1.5
",
        vec![
            let_function(
                "f",
                vec![scalar_param("a", DataType::Float64)],
                vec![BoundStatement::Expr(binary(BinaryOp::Add, var("a"), lit(0.5)))],
            ),
            BoundStatement::Query(print(vec![named(
                "v",
                user_call("f", vec![BoundArg::Expr(lit(1_i64))]),
            )])),
        ],
    );
}

#[test]
fn to_scalar_takes_first_value() {
    assert_output(
        "
v:long
------------------
1
",
        query(print(vec![named(
            "v",
            to_scalar(print(vec![named("a", lit(1_i64)), named("b", lit(2_i64))])),
        )])),
    );
}

#[test]
fn row_cumsum_single_chunk() {
    assert_output(
        "
cs:long
------------------
1
3
6
10
",
        query(
            datatable(&[("v", DataType::Int64)], longs(&[1, 2, 3, 4]))
                .unwrap()
                .pipe(BoundOperator::Project(vec![named(
                    "cs",
                    call("row_cumsum", vec![col("v"), lit(false)]),
                )])),
        ),
    );
}

#[test]
fn row_cumsum_carries_across_chunks() {
    assert_output(
        "
cs:long
------------------
1
3
6
7
9
12
",
        vec![
            let_query(
                "t",
                datatable(&[("v", DataType::Int64)], longs(&[1, 2, 3])).unwrap(),
            ),
            BoundStatement::Query(
                BoundQuery::Union(vec![table("t"), table("t")]).pipe(BoundOperator::Project(vec![
                    named("cs", call("row_cumsum", vec![col("v"), lit(false)])),
                ])),
            ),
        ],
    );
}

#[test]
fn row_cumsum_restarts() {
    let input = datatable(
        &[("v", DataType::Int32), ("r", DataType::Boolean)],
        vec![
            1_i32.into(),
            false.into(),
            2_i32.into(),
            false.into(),
            3_i32.into(),
            true.into(),
            4_i32.into(),
            false.into(),
        ],
    )
    .unwrap();
    assert_output(
        "
cs:int
------------------
1
3
3
7
",
        query(input.pipe(BoundOperator::Project(vec![named(
            "cs",
            call("row_cumsum", vec![col("v"), col("r")]),
        )]))),
    );
}

fn cumulative() -> BoundQuery {
    datatable(&[("v", DataType::Int32)], vec![10_i32.into(), 10_i32.into()])
        .unwrap()
        .pipe(BoundOperator::Project(vec![named(
            "cs",
            call("row_cumsum", vec![col("v"), lit(false)]),
        )]))
}

fn normalized(d: BoundQuery) -> Vec<BoundStatement> {
    vec![
        let_query("d", d),
        let_expr(
            "a",
            to_scalar(table("d").pipe(BoundOperator::Summarize {
                aggregates: vec![unnamed(call("max", vec![col("cs")]))],
                by: vec![],
            })),
        ),
        BoundStatement::Query(table("d").pipe(BoundOperator::Extend(vec![named(
            "normalized",
            binary(BinaryOp::Divide, call("todouble", vec![col("cs")]), var("a")),
        )]))),
    ]
}

const NORMALIZED: &str = "
cs:int; normalized:real
------------------
10; 0.5
20; 1
";

#[test]
fn window_state_is_fresh_per_evaluation() {
    assert_output(NORMALIZED, normalized(cumulative()));
}

#[test]
fn materialize_shares_results() {
    assert_output(NORMALIZED, normalized(BoundQuery::Materialize(Box::new(cumulative()))));
}

#[test]
fn materialize_scans_once() {
    let schema = Schema::try_new([Field::new("v", DataType::Float64)]).unwrap();
    let batch = Batch::try_new(vec![
        Array::try_from_values::<PhysicalF64>(DataType::Float64, vec![1.0, 2.0]).unwrap(),
    ])
    .unwrap();
    let source = MemoryTableSource::try_new("Once", schema, vec![batch])
        .unwrap()
        .with_single_scan();

    let mut engine = engine();
    engine.register_table(Arc::new(source)).unwrap();
    let got = run_with(
        &engine,
        vec![
            let_query("m", BoundQuery::Materialize(Box::new(table("Once")))),
            BoundStatement::Query(BoundQuery::Union(vec![table("m"), table("m")])),
        ],
    );
    assert_eq!("v:real\n------------------\n1\n2\n1\n2\n", got);
}

fn sample_table() -> MemoryTableSource {
    let schema = Schema::try_new([
        Field::new("AppMachine", DataType::Utf8),
        Field::new("CounterName", DataType::Utf8),
        Field::new("CounterValue", DataType::Float64),
    ])
    .unwrap();
    let strings = |values: &[&str]| {
        Array::try_from_values::<PhysicalUtf8>(
            DataType::Utf8,
            values.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    };
    let batch = Batch::try_new(vec![
        strings(&["vm0", "vm0", "vm1", "vm1", "vm2"]),
        strings(&["cpu", "mem", "cpu", "mem", "cpu"]),
        Array::try_from_values::<PhysicalF64>(DataType::Float64, vec![50.0, 30.0, 20.0, 5.0, 100.0])
            .unwrap(),
    ])
    .unwrap();
    MemoryTableSource::try_new("MyTable", schema, vec![batch]).unwrap()
}

#[test]
fn global_table_pipeline() {
    let mut engine = engine();
    engine.register_table(Arc::new(sample_table())).unwrap();

    let got = run_with(
        &engine,
        vec![
            let_expr("c", lit(100.0)),
            BoundStatement::Query(
                table("MyTable")
                    .pipe(BoundOperator::Project(vec![
                        named("frac", binary(BinaryOp::Divide, col("CounterValue"), var("c"))),
                        unnamed(col("AppMachine")),
                        unnamed(col("CounterName")),
                    ]))
                    .pipe(BoundOperator::Summarize {
                        aggregates: vec![unnamed(call("avg", vec![col("frac")]))],
                        by: vec![unnamed(col("CounterName"))],
                    })
                    .pipe(BoundOperator::Project(vec![
                        unnamed(col("CounterName")),
                        named(
                            "avgRoundedPercent",
                            call(
                                "tolong",
                                vec![binary(BinaryOp::Multiply, col("avg_frac"), lit(100_i64))],
                            ),
                        ),
                    ])),
            ),
        ],
    );
    // tolong truncates.
    assert_eq!(
        "CounterName:string; avgRoundedPercent:long\n------------------\ncpu; 56\nmem; 17\n",
        got
    );
}

#[test]
fn async_table_source() {
    let mut engine = engine();
    engine
        .register_table(Arc::new(sample_table().with_async_scan()))
        .unwrap();

    let result = engine
        .evaluate(&BoundScript::query(
            table("MyTable").pipe(BoundOperator::Count { name: None }),
        ))
        .unwrap();
    let table = result.into_table().unwrap();
    let batches: Vec<_> = block_on(table.into_stream().collect());
    let batches = batches.into_iter().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(1, batches.len());
    assert_eq!(ScalarValue::from(5_i64), batches[0].row(0).unwrap()[0]);
}

#[test]
fn unknown_table() {
    let err = engine()
        .evaluate(&BoundScript::query(table("Missing")))
        .unwrap_err();
    assert!(err.message().contains("Missing"), "{err}");
}

#[test]
fn cancelled_before_pulling() {
    let token = CancellationToken::new();
    let result = engine()
        .evaluate_with_cancellation(&BoundScript::query(counters()), token.clone())
        .unwrap();
    token.cancel();

    let err = result.dump_to_string().unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(ErrorKind::Cancelled, err.kind());
}

fn chunked_table() -> MemoryTableSource {
    let schema = Schema::try_new([
        Field::new("name", DataType::Utf8),
        Field::new("v", DataType::Float64),
    ])
    .unwrap();
    let chunk = |names: &[&str], values: Vec<f64>| {
        Batch::try_new(vec![
            Array::try_from_values::<PhysicalUtf8>(
                DataType::Utf8,
                names.iter().map(|s| s.to_string()).collect(),
            )
            .unwrap(),
            Array::try_from_values::<PhysicalF64>(DataType::Float64, values).unwrap(),
        ])
        .unwrap()
    };
    let batches = vec![
        chunk(&["a", "b"], vec![1.0, 2.5]),
        chunk(&["c", "d", "e"], vec![3.0, 4.5, 5.0]),
        chunk(&["f"], vec![6.0]),
    ];
    MemoryTableSource::try_new("Chunked", schema, batches).unwrap()
}

#[test]
fn stream_rows_match_row_cursor() {
    let mut engine = engine();
    engine.register_table(Arc::new(chunked_table())).unwrap();
    let script = BoundScript::query(table("Chunked").pipe(BoundOperator::Extend(vec![named(
        "twice",
        binary(BinaryOp::Multiply, col("v"), lit(2_i64)),
    )])));

    let mut cursor = engine.evaluate(&script).unwrap().into_table().unwrap();
    let mut cursor_rows = Vec::new();
    while let Some(row) = cursor.next_row().unwrap() {
        cursor_rows.push(row);
    }

    let stream = engine.evaluate(&script).unwrap().into_table().unwrap().into_stream();
    let batches: Vec<_> = block_on(stream.collect());
    let batches = batches.into_iter().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(3, batches.len());

    let stream_rows: Vec<_> = batches
        .iter()
        .flat_map(|batch| (0..batch.num_rows()).map(|idx| batch.row(idx).unwrap()))
        .collect();

    assert_eq!(6, cursor_rows.len());
    assert_eq!(cursor_rows, stream_rows);
    assert_eq!(
        vec![ScalarValue::from("d"), ScalarValue::from(4.5), ScalarValue::from(9.0)],
        cursor_rows[3]
    );
}

#[test]
fn reals_render_in_shortest_form() {
    assert_output(
        r#"
a:real; s:string
------------------
1.5; 1.5
50; 50
0.30000000000000004; 0.30000000000000004
1E+300; 1E+300
2.5E-07; 2.5E-07
"#,
        query(
            datatable(
                &[("a", DataType::Float64)],
                vec![
                    1.5.into(),
                    50.0.into(),
                    (0.1 + 0.2).into(),
                    1e300.into(),
                    2.5e-7.into(),
                ],
            )
            .unwrap()
            .pipe(BoundOperator::Extend(vec![named("s", call("tostring", vec![col("a")]))])),
        ),
    );
}
