use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ENGINES: &[(&str, &str)] = &[
    ("Pandoc", "/api/v1/engines/pandoc"),
    ("LaTeX", "/api/v1/engines/latex"),
    ("Typst", "/api/v1/engines/typst"),
];

const FIELD_TYPES: &[(&str, &str)] = &[
    ("String", "Single line of text"),
    ("Text", "Multi-line text"),
    ("Number", "Numeric value"),
    ("Date", "Calendar date"),
    ("Time", "Time of day"),
    ("Email", "Email address"),
    ("Phone", "Phone number"),
    ("Url", "Web address"),
    ("File", "Uploaded file"),
    ("Table", "Tabular data"),
    ("Checkbox", "Boolean choice"),
    ("Radio", "Single choice from options"),
    ("Select", "Dropdown choice"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut engines = Query::insert()
            .into_table(Engines::Table)
            .columns([Engines::Name, Engines::ApiRoute])
            .to_owned();
        for (name, route) in ENGINES {
            engines.values_panic([(*name).into(), (*route).into()]);
        }
        manager.exec_stmt(engines).await?;

        let mut field_types = Query::insert()
            .into_table(FieldTypes::Table)
            .columns([FieldTypes::Name, FieldTypes::Description])
            .to_owned();
        for (name, description) in FIELD_TYPES {
            field_types.values_panic([(*name).into(), (*description).into()]);
        }
        manager.exec_stmt(field_types).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete().from_table(FieldTypes::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Engines::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Engines {
    Table,
    Name,
    ApiRoute,
}

#[derive(Iden)]
enum FieldTypes {
    Table,
    Name,
    Description,
}
