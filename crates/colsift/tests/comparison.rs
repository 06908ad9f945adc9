use colsift::{
    Change, ChangedColumnGenerator, CompareContext, Comparison, Database, GeneratorRegistry,
    GenericColumnGenerator, ModelColumnGenerator, ObjectDifferences, ObjectKind, OutputControl,
    Priority,
};
use colsift_schema::{Column, DataType, DefaultValue, Dialect};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ty(token: &str) -> DataType {
    DataType::parse(token).unwrap()
}

fn model_vs_db(dialect: Dialect) -> Comparison {
    Comparison::new(
        Database::model("entities", dialect),
        Database::live("app", dialect),
    )
}

fn post_model() -> Vec<Column> {
    vec![
        Column::new("id", ty("int8")).not_null().auto_increment(),
        Column::new("title", ty("varchar(255)")).not_null(),
        Column::new("views", ty("int4")).not_null(),
        Column::new("body", ty("clob")),
        Column::new("published_at", ty("timestamp(6)")),
        Column::new("slug", ty("varchar(64)")).not_null(),
    ]
}

fn post_db() -> Vec<Column> {
    vec![
        Column::new("id", ty("bigint"))
            .not_null()
            .auto_increment()
            .with_default(DefaultValue::function("nextval('post_id_seq'::regclass)"))
            .at_position(1),
        Column::new("title", ty("character varying(255)"))
            .not_null()
            .at_position(2),
        Column::new("views", ty("bigint")).not_null().at_position(3),
        Column::new("body", ty("text")).at_position(4),
        Column::new("published_at", ty("timestamp without time zone"))
            .with_default(DefaultValue::function("CURRENT_TIMESTAMP"))
            .at_position(5),
        Column::new("legacy_flag", ty("boolean"))
            .with_default(DefaultValue::literal("false"))
            .at_position(6),
    ]
}

#[test]
fn model_against_postgres() {
    init_tracing();
    let comparison = model_vs_db(Dialect::Postgres);
    let diff = comparison
        .compare_table("post", &post_model(), &post_db())
        .unwrap();

    insta::assert_snapshot!(diff.to_string().trim_end(), @r"
    post:
      + slug: varchar(64)
      - legacy_flag
      ~ views: bigint -> int4
    ");

    insta::assert_snapshot!(
        diff.to_sql(comparison.target_dialect(), &OutputControl::default())
            .trim_end(),
        @r#"
    -- Table: post
    ALTER TABLE "post" ADD COLUMN "slug" varchar(64) NOT NULL;
    ALTER TABLE "post" DROP COLUMN "legacy_flag";
    ALTER TABLE "post" ALTER COLUMN "views" TYPE int4 USING "views"::int4;
    "#
    );
}

#[test]
fn database_against_database_keeps_everything() {
    init_tracing();
    let comparison = Comparison::new(
        Database::live("staging", Dialect::Postgres),
        Database::live("prod", Dialect::Postgres),
    );
    let staging = Column::new("created_at", ty("timestamp(6)")).at_position(1);
    let prod = Column::new("created_at", ty("timestamp without time zone"))
        .with_default(DefaultValue::function("now()"))
        .at_position(2);

    let changes = comparison.compare_column(&staging, &prod).unwrap();
    assert_eq!(
        changes,
        vec![
            Change::AlterColumnType {
                name: "created_at".to_string(),
                from: ty("timestamp without time zone"),
                to: ty("timestamp(6)"),
                definition: Column::new("created_at", ty("timestamp(6)")).at_position(2),
            },
            Change::AlterColumnDefault {
                name: "created_at".to_string(),
                from: Some(DefaultValue::function("now()")),
                to: None,
            },
        ]
    );
}

#[test]
fn model_as_compared_side() {
    init_tracing();
    let comparison = Comparison::new(
        Database::live("app", Dialect::MySql),
        Database::model("entities", Dialect::MySql),
    );
    assert_eq!(comparison.target_dialect(), Dialect::MySql);

    let db = Column::new("active", ty("tinyint(1)"))
        .not_null()
        .with_default(DefaultValue::function("CURRENT_TIMESTAMP"))
        .at_position(7);
    let model = Column::new("active", ty("boolean")).not_null();

    assert!(comparison.compare_column(&db, &model).unwrap().is_empty());
}

#[test]
fn mysql_catalog_types_resolve() {
    init_tracing();
    let comparison = model_vs_db(Dialect::MySql);
    let model = vec![
        Column::new("id", ty("serial")).not_null(),
        Column::new("hits", ty("int")).not_null(),
        Column::new("flags", ty("bit(8)")),
        Column::new("state", ty("enum('a','b')")),
        Column::new("born", ty("year")),
    ];
    let db = vec![
        Column::new("id", ty("bigint(20) unsigned")).not_null().at_position(1),
        Column::new("hits", ty("int(10) unsigned")).not_null().at_position(2),
        Column::new("flags", ty("tinyint")).at_position(3),
        Column::new("state", ty("ENUM('a', 'b')")).at_position(4),
        Column::new("born", ty("year(4)")).at_position(5),
    ];

    let diff = comparison.compare_table("stat", &model, &db).unwrap();
    insta::assert_snapshot!(diff.to_string().trim_end(), @r"
    stat:
      ~ hits: int(10) unsigned -> int
      ~ flags: tinyint -> bit(8)
    ");
}

#[test]
fn mysql_type_change_keeps_constraints() {
    init_tracing();
    let comparison = model_vs_db(Dialect::MySql);
    let model = vec![
        Column::new("age", ty("bigint"))
            .not_null()
            .with_default(DefaultValue::literal("0")),
    ];
    let db = vec![
        Column::new("age", ty("int"))
            .not_null()
            .with_default(DefaultValue::literal("0"))
            .at_position(2),
    ];

    let diff = comparison.compare_table("user", &model, &db).unwrap();
    insta::assert_snapshot!(
        diff.to_sql(comparison.target_dialect(), &OutputControl::default())
            .trim_end(),
        @r"
    -- Table: user
    ALTER TABLE `user` MODIFY COLUMN `age` bigint NOT NULL DEFAULT 0;
    "
    );
}

#[test]
fn precision_inside_type_name_survives_into_sql() {
    init_tracing();
    let comparison = model_vs_db(Dialect::Postgres);
    let model = vec![Column::new("at", ty("timestamp(3) with time zone"))];
    let db = vec![Column::new("at", ty("timestamp with time zone")).at_position(1)];

    let diff = comparison.compare_table("ev", &model, &db).unwrap();
    insta::assert_snapshot!(
        diff.to_sql(comparison.target_dialect(), &OutputControl::default())
            .trim_end(),
        @r#"
    -- Table: ev
    ALTER TABLE "ev" ALTER COLUMN "at" TYPE timestamp(3) with time zone USING "at"::timestamp(3) with time zone;
    "#
    );
}

#[test]
fn unknown_type_aborts_the_table() {
    init_tracing();
    let comparison = model_vs_db(Dialect::Postgres);
    let model = vec![Column::new("area", ty("geometry"))];
    let db = vec![Column::new("area", ty("text"))];

    let err = comparison.compare_table("parcel", &model, &db).unwrap_err();
    assert!(matches!(err, colsift::Error::Resolve(_)));
}

struct Counting {
    calls: Arc<AtomicUsize>,
}

impl ChangedColumnGenerator for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn priority(&self, kind: ObjectKind, database: &Database) -> Priority {
        GenericColumnGenerator.priority(kind, database)
    }

    fn fix_changed(
        &self,
        reference: &Column,
        compared: &Column,
        differences: &mut ObjectDifferences,
        ctx: &CompareContext<'_>,
    ) -> colsift::Result<Vec<Change>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        GenericColumnGenerator.fix_changed(reference, compared, differences, ctx)
    }
}

#[test]
fn fallback_runs_even_when_everything_is_suppressed() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = GeneratorRegistry::empty();
    registry.register(ModelColumnGenerator::with_fallback(Counting {
        calls: calls.clone(),
    }));
    let comparison = model_vs_db(Dialect::Postgres).with_registry(registry);

    let model = Column::new("id", ty("int8"));
    let db = Column::new("id", ty("bigint")).at_position(1);
    assert!(comparison.compare_column(&model, &db).unwrap().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn empty_registry_generates_nothing() {
    init_tracing();
    let comparison = model_vs_db(Dialect::Postgres).with_registry(GeneratorRegistry::empty());
    let model = Column::new("id", ty("int4"));
    let db = Column::new("id", ty("bigint"));
    assert!(comparison.compare_column(&model, &db).unwrap().is_empty());
}
