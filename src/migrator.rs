use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_skus_table::Migration),
            Box::new(m20240101_000002_create_stock_movements_table::Migration),
            Box::new(m20240101_000003_create_customers_table::Migration),
            Box::new(m20240101_000004_create_suppliers_table::Migration),
            Box::new(m20240101_000005_create_sales_invoices_table::Migration),
            Box::new(m20240101_000006_create_sales_invoice_lines_table::Migration),
            Box::new(m20240101_000007_create_purchase_invoices_table::Migration),
            Box::new(m20240101_000008_create_purchase_invoice_lines_table::Migration),
            Box::new(m20240101_000009_create_installment_plans_table::Migration),
            Box::new(m20240101_000010_create_installment_payments_table::Migration),
            Box::new(m20240101_000011_create_returns_table::Migration),
            Box::new(m20240101_000012_create_return_lines_table::Migration),
            Box::new(m20240101_000013_create_stock_takes_table::Migration),
            Box::new(m20240101_000014_create_ledger_entries_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_skus_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_skus_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create skus table aligned with entities::sku Model
            manager
                .create_table(
                    Table::create()
                        .table(Skus::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Skus::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Skus::Code).string().not_null())
                        .col(ColumnDef::new(Skus::Name).string().not_null())
                        .col(ColumnDef::new(Skus::Category).string().null())
                        .col(ColumnDef::new(Skus::Unit).string().null())
                        .col(
                            ColumnDef::new(Skus::QuantityOnHand)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Skus::PurchasePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Skus::SalePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Skus::ReorderLevel)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Skus::SupplierId).uuid().null())
                        .col(ColumnDef::new(Skus::ExpiryDate).date().null())
                        .col(ColumnDef::new(Skus::Barcode).string().null())
                        .col(
                            ColumnDef::new(Skus::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Skus::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Skus::UpdatedAt).timestamp().null())
                        .col(
                            ColumnDef::new(Skus::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_skus_code")
                        .table(Skus::Table)
                        .col(Skus::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_skus_category")
                        .table(Skus::Table)
                        .col(Skus::Category)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_skus_expiry_date")
                        .table(Skus::Table)
                        .col(Skus::ExpiryDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Skus::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Skus {
        Table,
        Id,
        Code,
        Name,
        Category,
        Unit,
        QuantityOnHand,
        PurchasePrice,
        SalePrice,
        ReorderLevel,
        SupplierId,
        ExpiryDate,
        Barcode,
        IsActive,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20240101_000002_create_stock_movements_table {

    use super::m20240101_000001_create_skus_table::Skus;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Append-only movement ledger; quantity is stored signed
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::SkuId).uuid().not_null())
                        .col(ColumnDef::new(StockMovements::Kind).string().not_null())
                        .col(
                            ColumnDef::new(StockMovements::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::Reference).string().null())
                        .col(ColumnDef::new(StockMovements::ActorId).string().not_null())
                        .col(
                            ColumnDef::new(StockMovements::OccurredAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_movements_sku_id")
                                .from(StockMovements::Table, StockMovements::SkuId)
                                .to(Skus::Table, Skus::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_sku_id")
                        .table(StockMovements::Table)
                        .col(StockMovements::SkuId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_occurred_at")
                        .table(StockMovements::Table)
                        .col(StockMovements::OccurredAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_kind")
                        .table(StockMovements::Table)
                        .col(StockMovements::Kind)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockMovements {
        Table,
        Id,
        SkuId,
        Kind,
        Quantity,
        Reference,
        ActorId,
        OccurredAt,
    }
}

mod m20240101_000003_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(
                            ColumnDef::new(Customers::Balance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Customers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_name")
                        .table(Customers::Table)
                        .col(Customers::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Phone,
        Address,
        Balance,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_suppliers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::Phone).string().null())
                        .col(ColumnDef::new(Suppliers::Address).string().null())
                        .col(
                            ColumnDef::new(Suppliers::Balance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_suppliers_name")
                        .table(Suppliers::Table)
                        .col(Suppliers::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        Name,
        Phone,
        Address,
        Balance,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_sales_invoices_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_sales_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesInvoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesInvoices::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesInvoices::InvoiceNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesInvoices::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(SalesInvoices::IssuedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesInvoices::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SalesInvoices::PaidAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SalesInvoices::PaymentMethod).string().null())
                        .col(ColumnDef::new(SalesInvoices::Notes).string().null())
                        .col(
                            ColumnDef::new(SalesInvoices::CreatedBy)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesInvoices::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_invoices_invoice_number")
                        .table(SalesInvoices::Table)
                        .col(SalesInvoices::InvoiceNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_invoices_customer_id")
                        .table(SalesInvoices::Table)
                        .col(SalesInvoices::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_invoices_issued_at")
                        .table(SalesInvoices::Table)
                        .col(SalesInvoices::IssuedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesInvoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SalesInvoices {
        Table,
        Id,
        InvoiceNumber,
        CustomerId,
        IssuedAt,
        TotalAmount,
        PaidAmount,
        PaymentMethod,
        Notes,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000006_create_sales_invoice_lines_table {

    use super::m20240101_000005_create_sales_invoices_table::SalesInvoices;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_sales_invoice_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesInvoiceLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesInvoiceLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesInvoiceLines::InvoiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesInvoiceLines::SkuId).uuid().not_null())
                        .col(
                            ColumnDef::new(SalesInvoiceLines::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesInvoiceLines::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sales_invoice_lines_invoice_id")
                                .from(SalesInvoiceLines::Table, SalesInvoiceLines::InvoiceId)
                                .to(SalesInvoices::Table, SalesInvoices::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_invoice_lines_invoice_id")
                        .table(SalesInvoiceLines::Table)
                        .col(SalesInvoiceLines::InvoiceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_invoice_lines_sku_id")
                        .table(SalesInvoiceLines::Table)
                        .col(SalesInvoiceLines::SkuId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesInvoiceLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SalesInvoiceLines {
        Table,
        Id,
        InvoiceId,
        SkuId,
        Quantity,
        UnitPrice,
    }
}

mod m20240101_000007_create_purchase_invoices_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_purchase_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseInvoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseInvoices::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoices::InvoiceNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoices::SupplierId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoices::IssuedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoices::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoices::PaidAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PurchaseInvoices::Notes).string().null())
                        .col(
                            ColumnDef::new(PurchaseInvoices::CreatedBy)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoices::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_invoices_invoice_number")
                        .table(PurchaseInvoices::Table)
                        .col(PurchaseInvoices::InvoiceNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_invoices_supplier_id")
                        .table(PurchaseInvoices::Table)
                        .col(PurchaseInvoices::SupplierId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_invoices_issued_at")
                        .table(PurchaseInvoices::Table)
                        .col(PurchaseInvoices::IssuedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseInvoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseInvoices {
        Table,
        Id,
        InvoiceNumber,
        SupplierId,
        IssuedAt,
        TotalAmount,
        PaidAmount,
        Notes,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000008_create_purchase_invoice_lines_table {

    use super::m20240101_000007_create_purchase_invoices_table::PurchaseInvoices;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_purchase_invoice_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseInvoiceLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseInvoiceLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoiceLines::InvoiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoiceLines::SkuId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoiceLines::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseInvoiceLines::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_invoice_lines_invoice_id")
                                .from(
                                    PurchaseInvoiceLines::Table,
                                    PurchaseInvoiceLines::InvoiceId,
                                )
                                .to(PurchaseInvoices::Table, PurchaseInvoices::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_invoice_lines_invoice_id")
                        .table(PurchaseInvoiceLines::Table)
                        .col(PurchaseInvoiceLines::InvoiceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_invoice_lines_sku_id")
                        .table(PurchaseInvoiceLines::Table)
                        .col(PurchaseInvoiceLines::SkuId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseInvoiceLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseInvoiceLines {
        Table,
        Id,
        InvoiceId,
        SkuId,
        Quantity,
        UnitPrice,
    }
}

mod m20240101_000009_create_installment_plans_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_installment_plans_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InstallmentPlans::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InstallmentPlans::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::CustomerId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::SalesInvoiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InstallmentPlans::Kind).string().not_null())
                        .col(ColumnDef::new(InstallmentPlans::Status).string().not_null())
                        .col(
                            ColumnDef::new(InstallmentPlans::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::DownPayment)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::RemainingAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::MonthsLeft)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::MonthlyAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::NextDueDate)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::CreatedBy)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPlans::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_installment_plans_customer_id")
                        .table(InstallmentPlans::Table)
                        .col(InstallmentPlans::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_installment_plans_status")
                        .table(InstallmentPlans::Table)
                        .col(InstallmentPlans::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_installment_plans_next_due_date")
                        .table(InstallmentPlans::Table)
                        .col(InstallmentPlans::NextDueDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InstallmentPlans::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InstallmentPlans {
        Table,
        Id,
        CustomerId,
        SalesInvoiceId,
        Kind,
        Status,
        TotalAmount,
        DownPayment,
        RemainingAmount,
        MonthsLeft,
        MonthlyAmount,
        NextDueDate,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000010_create_installment_payments_table {

    use super::m20240101_000009_create_installment_plans_table::InstallmentPlans;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000010_create_installment_payments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InstallmentPayments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InstallmentPayments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPayments::PlanId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPayments::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InstallmentPayments::Method).string().null())
                        .col(ColumnDef::new(InstallmentPayments::Notes).string().null())
                        .col(
                            ColumnDef::new(InstallmentPayments::PaidAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InstallmentPayments::RecordedBy)
                                .string()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_installment_payments_plan_id")
                                .from(InstallmentPayments::Table, InstallmentPayments::PlanId)
                                .to(InstallmentPlans::Table, InstallmentPlans::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_installment_payments_plan_id")
                        .table(InstallmentPayments::Table)
                        .col(InstallmentPayments::PlanId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_installment_payments_paid_at")
                        .table(InstallmentPayments::Table)
                        .col(InstallmentPayments::PaidAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InstallmentPayments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InstallmentPayments {
        Table,
        Id,
        PlanId,
        Amount,
        Method,
        Notes,
        PaidAt,
        RecordedBy,
    }
}

mod m20240101_000011_create_returns_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000011_create_returns_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Returns::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Returns::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Returns::Direction).string().not_null())
                        .col(ColumnDef::new(Returns::Status).string().not_null())
                        .col(ColumnDef::new(Returns::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(Returns::CounterpartyId).uuid().not_null())
                        .col(ColumnDef::new(Returns::Reason).string().null())
                        .col(
                            ColumnDef::new(Returns::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Returns::RequestedBy).string().not_null())
                        .col(ColumnDef::new(Returns::RequestedAt).timestamp().not_null())
                        .col(ColumnDef::new(Returns::DecidedBy).string().null())
                        .col(ColumnDef::new(Returns::DecidedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_returns_status")
                        .table(Returns::Table)
                        .col(Returns::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_returns_invoice_id")
                        .table(Returns::Table)
                        .col(Returns::InvoiceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_returns_requested_at")
                        .table(Returns::Table)
                        .col(Returns::RequestedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Returns::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Returns {
        Table,
        Id,
        Direction,
        Status,
        InvoiceId,
        CounterpartyId,
        Reason,
        TotalAmount,
        RequestedBy,
        RequestedAt,
        DecidedBy,
        DecidedAt,
    }
}

mod m20240101_000012_create_return_lines_table {

    use super::m20240101_000011_create_returns_table::Returns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000012_create_return_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ReturnLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReturnLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReturnLines::ReturnId).uuid().not_null())
                        .col(ColumnDef::new(ReturnLines::SkuId).uuid().not_null())
                        .col(ColumnDef::new(ReturnLines::Quantity).decimal().not_null())
                        .col(ColumnDef::new(ReturnLines::UnitPrice).decimal().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_return_lines_return_id")
                                .from(ReturnLines::Table, ReturnLines::ReturnId)
                                .to(Returns::Table, Returns::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_return_lines_return_id")
                        .table(ReturnLines::Table)
                        .col(ReturnLines::ReturnId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReturnLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ReturnLines {
        Table,
        Id,
        ReturnId,
        SkuId,
        Quantity,
        UnitPrice,
    }
}

mod m20240101_000013_create_stock_takes_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000013_create_stock_takes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockTakes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTakes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTakes::SkuId).uuid().not_null())
                        .col(ColumnDef::new(StockTakes::Kind).string().not_null())
                        .col(ColumnDef::new(StockTakes::WindowStart).date().not_null())
                        .col(ColumnDef::new(StockTakes::WindowEnd).date().not_null())
                        .col(
                            ColumnDef::new(StockTakes::ExpectedQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTakes::CountedQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTakes::Difference).decimal().not_null())
                        .col(ColumnDef::new(StockTakes::TakenBy).string().not_null())
                        .col(ColumnDef::new(StockTakes::TakenAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_takes_sku_id")
                        .table(StockTakes::Table)
                        .col(StockTakes::SkuId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_takes_taken_at")
                        .table(StockTakes::Table)
                        .col(StockTakes::TakenAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockTakes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockTakes {
        Table,
        Id,
        SkuId,
        Kind,
        WindowStart,
        WindowEnd,
        ExpectedQuantity,
        CountedQuantity,
        Difference,
        TakenBy,
        TakenAt,
    }
}

mod m20240101_000014_create_ledger_entries_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000014_create_ledger_entries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(LedgerEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LedgerEntries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(LedgerEntries::BranchCode).string().null())
                        .col(ColumnDef::new(LedgerEntries::EntryType).string().not_null())
                        .col(ColumnDef::new(LedgerEntries::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(LedgerEntries::Description)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(LedgerEntries::Reference).string().null())
                        .col(
                            ColumnDef::new(LedgerEntries::EntryDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(LedgerEntries::CreatedBy).string().not_null())
                        .col(
                            ColumnDef::new(LedgerEntries::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ledger_entries_entry_date")
                        .table(LedgerEntries::Table)
                        .col(LedgerEntries::EntryDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ledger_entries_entry_type")
                        .table(LedgerEntries::Table)
                        .col(LedgerEntries::EntryType)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum LedgerEntries {
        Table,
        Id,
        BranchCode,
        EntryType,
        Amount,
        Description,
        Reference,
        EntryDate,
        CreatedBy,
        CreatedAt,
    }
}
