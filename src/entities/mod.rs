pub mod customer;
pub mod installment_payment;
pub mod installment_plan;
pub mod ledger_entry;
pub mod purchase_invoice;
pub mod purchase_invoice_line;
pub mod return_line;
pub mod return_request;
pub mod sales_invoice;
pub mod sales_invoice_line;
pub mod sku;
pub mod stock_movement;
pub mod stock_take;
pub mod supplier;
