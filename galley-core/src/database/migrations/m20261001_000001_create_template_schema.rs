use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organisations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organisations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organisations::Name).string().not_null())
                    .col(
                        ColumnDef::new(Organisations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::OrganisationId).integer().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_organisation_id")
                            .from(Users::Table, Users::OrganisationId)
                            .to(Organisations::Table, Organisations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assets::OrganisationId).integer().not_null())
                    .col(ColumnDef::new(Assets::Kind).string().not_null())
                    .col(ColumnDef::new(Assets::FileName).string().not_null())
                    .col(ColumnDef::new(Assets::StorageKey).string().not_null())
                    .col(ColumnDef::new(Assets::ContentType).string())
                    .col(ColumnDef::new(Assets::Size).big_integer().not_null())
                    .col(ColumnDef::new(Assets::Checksum).string().not_null())
                    .col(ColumnDef::new(Assets::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assets_organisation_id")
                            .from(Assets::Table, Assets::OrganisationId)
                            .to(Organisations::Table, Organisations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Engines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Engines::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Engines::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Engines::ApiRoute).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FieldTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FieldTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FieldTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FieldTypes::Description).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Themes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Themes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Themes::OrganisationId).integer().not_null())
                    .col(ColumnDef::new(Themes::CreatorId).integer().not_null())
                    .col(ColumnDef::new(Themes::Name).string().not_null())
                    .col(ColumnDef::new(Themes::Font).string())
                    .col(
                        ColumnDef::new(Themes::Typescale)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Themes::BodyColor).string())
                    .col(ColumnDef::new(Themes::PrimaryColor).string())
                    .col(ColumnDef::new(Themes::SecondaryColor).string())
                    .col(ColumnDef::new(Themes::HeadingColor).string())
                    .col(
                        ColumnDef::new(Themes::FontAssetIds)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Themes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Themes::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_themes_organisation_id")
                            .from(Themes::Table, Themes::OrganisationId)
                            .to(Organisations::Table, Organisations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Frames::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Frames::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Frames::OrganisationId).integer().not_null())
                    .col(ColumnDef::new(Frames::CreatorId).integer().not_null())
                    .col(ColumnDef::new(Frames::Name).string().not_null())
                    .col(ColumnDef::new(Frames::Description).text())
                    .col(ColumnDef::new(Frames::FrameType).string().not_null())
                    .col(ColumnDef::new(Frames::AssetId).integer().not_null())
                    .col(ColumnDef::new(Frames::Checksum).string().not_null())
                    .col(ColumnDef::new(Frames::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Frames::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_frames_asset_id")
                            .from(Frames::Table, Frames::AssetId)
                            .to(Assets::Table, Assets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Layouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Layouts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Layouts::OrganisationId).integer().not_null())
                    .col(ColumnDef::new(Layouts::CreatorId).integer().not_null())
                    .col(ColumnDef::new(Layouts::Name).string().not_null())
                    .col(ColumnDef::new(Layouts::Slug).string().not_null())
                    .col(ColumnDef::new(Layouts::Description).text())
                    .col(ColumnDef::new(Layouts::Width).double())
                    .col(ColumnDef::new(Layouts::Height).double())
                    .col(ColumnDef::new(Layouts::Unit).string())
                    .col(
                        ColumnDef::new(Layouts::Margin)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Layouts::EngineId).integer())
                    .col(ColumnDef::new(Layouts::FrameId).integer())
                    .col(ColumnDef::new(Layouts::AssetId).integer())
                    .col(ColumnDef::new(Layouts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Layouts::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_layouts_engine_id")
                            .from(Layouts::Table, Layouts::EngineId)
                            .to(Engines::Table, Engines::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_layouts_frame_id")
                            .from(Layouts::Table, Layouts::FrameId)
                            .to(Frames::Table, Frames::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Flows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Flows::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Flows::OrganisationId).integer().not_null())
                    .col(ColumnDef::new(Flows::CreatorId).integer().not_null())
                    .col(ColumnDef::new(Flows::Name).string().not_null())
                    .col(
                        ColumnDef::new(Flows::Controlled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Flows::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Flows::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FlowStates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FlowStates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FlowStates::FlowId).integer().not_null())
                    .col(ColumnDef::new(FlowStates::OrganisationId).integer().not_null())
                    .col(ColumnDef::new(FlowStates::State).string().not_null())
                    .col(ColumnDef::new(FlowStates::Order).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flow_states_flow_id")
                            .from(FlowStates::Table, FlowStates::FlowId)
                            .to(Flows::Table, Flows::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContentTypes::OrganisationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContentTypes::CreatorId).integer().not_null())
                    .col(ColumnDef::new(ContentTypes::Name).string().not_null())
                    .col(ColumnDef::new(ContentTypes::Description).text())
                    .col(ColumnDef::new(ContentTypes::Color).string())
                    .col(ColumnDef::new(ContentTypes::Prefix).string().not_null())
                    .col(ColumnDef::new(ContentTypes::ThemeId).integer().not_null())
                    .col(ColumnDef::new(ContentTypes::LayoutId).integer().not_null())
                    .col(ColumnDef::new(ContentTypes::FlowId).integer().not_null())
                    .col(
                        ColumnDef::new(ContentTypes::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentTypes::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_types_theme_id")
                            .from(ContentTypes::Table, ContentTypes::ThemeId)
                            .to(Themes::Table, Themes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_types_layout_id")
                            .from(ContentTypes::Table, ContentTypes::LayoutId)
                            .to(Layouts::Table, Layouts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_types_flow_id")
                            .from(ContentTypes::Table, ContentTypes::FlowId)
                            .to(Flows::Table, Flows::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentTypeFields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentTypeFields::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContentTypeFields::ContentTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContentTypeFields::FieldTypeId).integer())
                    .col(ColumnDef::new(ContentTypeFields::Name).string().not_null())
                    .col(ColumnDef::new(ContentTypeFields::Description).text())
                    .col(
                        ColumnDef::new(ContentTypeFields::Required)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ContentTypeFields::Order).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_type_fields_content_type_id")
                            .from(ContentTypeFields::Table, ContentTypeFields::ContentTypeId)
                            .to(ContentTypes::Table, ContentTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_type_fields_field_type_id")
                            .from(ContentTypeFields::Table, ContentTypeFields::FieldTypeId)
                            .to(FieldTypes::Table, FieldTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DataTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DataTemplates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DataTemplates::ContentTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DataTemplates::CreatorId).integer().not_null())
                    .col(ColumnDef::new(DataTemplates::Title).string().not_null())
                    .col(ColumnDef::new(DataTemplates::TitleTemplate).string())
                    .col(ColumnDef::new(DataTemplates::Data).text().not_null())
                    .col(ColumnDef::new(DataTemplates::Serialized).text().not_null())
                    .col(
                        ColumnDef::new(DataTemplates::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DataTemplates::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_data_templates_content_type_id")
                            .from(DataTemplates::Table, DataTemplates::ContentTypeId)
                            .to(ContentTypes::Table, ContentTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Names are unique per organisation; concurrent imports that pick the
        // same free name are serialised by these.
        create_unique_index(
            manager,
            "idx_themes_organisation_name",
            Themes::Table,
            Themes::OrganisationId,
            Themes::Name,
        )
        .await?;
        create_unique_index(
            manager,
            "idx_layouts_organisation_name",
            Layouts::Table,
            Layouts::OrganisationId,
            Layouts::Name,
        )
        .await?;
        create_unique_index(
            manager,
            "idx_frames_organisation_name",
            Frames::Table,
            Frames::OrganisationId,
            Frames::Name,
        )
        .await?;
        create_unique_index(
            manager,
            "idx_flows_organisation_name",
            Flows::Table,
            Flows::OrganisationId,
            Flows::Name,
        )
        .await?;
        create_unique_index(
            manager,
            "idx_content_types_organisation_name",
            ContentTypes::Table,
            ContentTypes::OrganisationId,
            ContentTypes::Name,
        )
        .await?;
        create_unique_index(
            manager,
            "idx_data_templates_creator_title",
            DataTemplates::Table,
            DataTemplates::CreatorId,
            DataTemplates::Title,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DataTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentTypeFields::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FlowStates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Flows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Layouts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Frames::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Themes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FieldTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Engines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organisations::Table).to_owned())
            .await
    }
}

async fn create_unique_index<T: Iden + 'static>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    owner: T,
    column: T,
) -> Result<(), DbErr> {
    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(name)
                .table(table)
                .col(owner)
                .col(column)
                .unique()
                .to_owned(),
        )
        .await
}

#[derive(Iden)]
enum Organisations {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    OrganisationId,
    Email,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Assets {
    Table,
    Id,
    OrganisationId,
    Kind,
    FileName,
    StorageKey,
    ContentType,
    Size,
    Checksum,
    CreatedAt,
}

#[derive(Iden)]
enum Engines {
    Table,
    Id,
    Name,
    ApiRoute,
}

#[derive(Iden)]
enum FieldTypes {
    Table,
    Id,
    Name,
    Description,
}

#[derive(Iden)]
enum Themes {
    Table,
    Id,
    OrganisationId,
    CreatorId,
    Name,
    Font,
    Typescale,
    BodyColor,
    PrimaryColor,
    SecondaryColor,
    HeadingColor,
    FontAssetIds,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Frames {
    Table,
    Id,
    OrganisationId,
    CreatorId,
    Name,
    Description,
    FrameType,
    AssetId,
    Checksum,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Layouts {
    Table,
    Id,
    OrganisationId,
    CreatorId,
    Name,
    Slug,
    Description,
    Width,
    Height,
    Unit,
    Margin,
    EngineId,
    FrameId,
    AssetId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Flows {
    Table,
    Id,
    OrganisationId,
    CreatorId,
    Name,
    Controlled,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum FlowStates {
    Table,
    Id,
    FlowId,
    OrganisationId,
    State,
    Order,
}

#[derive(Iden)]
enum ContentTypes {
    Table,
    Id,
    OrganisationId,
    CreatorId,
    Name,
    Description,
    Color,
    Prefix,
    ThemeId,
    LayoutId,
    FlowId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ContentTypeFields {
    Table,
    Id,
    ContentTypeId,
    FieldTypeId,
    Name,
    Description,
    Required,
    Order,
}

#[derive(Iden)]
enum DataTemplates {
    Table,
    Id,
    ContentTypeId,
    CreatorId,
    Title,
    TitleTemplate,
    Data,
    Serialized,
    CreatedAt,
    UpdatedAt,
}
