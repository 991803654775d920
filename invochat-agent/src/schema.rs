//! Table schemas surfaced to the model inside the SQL tool description, so
//! it can write accurate SELECTs without a discovery round-trip.

const INVOICES: &str = "\
Table: Invoices
- InvoiceRecordID SERIAL PRIMARY KEY
- InvoiceID VARCHAR(255)
- InvoiceDate DATE
- PurchaseOrder VARCHAR(255)
- DueDate DATE
- VendorName VARCHAR(255)
- VendorTaxID VARCHAR(255)
- VendorPhoneNumber VARCHAR(50)
- CustomerID VARCHAR(255)
- BillingAddress TEXT
- ShippingAddress TEXT
- ShippingAddressRecipient VARCHAR(255)
- SubTotal NUMERIC(18,2)
- SubTotalCurrencyCode VARCHAR(3)
- TotalTax NUMERIC(18,2)
- TotalTaxCurrencyCode VARCHAR(3)
- FreightAmount NUMERIC(18,2)
- FreightCurrencyCode VARCHAR(3)
- DiscountAmount NUMERIC(18,2)
- DiscountAmountCurrencyCode VARCHAR(3)
- InvoiceTotal NUMERIC(18,2)
- InvoiceTotalCurrencyCode VARCHAR(3)
- AmountDue NUMERIC(18,2)
- PreviousUnpaidBalance NUMERIC(18,2)
- SourceJsonFileName VARCHAR(500) UNIQUE
- ProcessedAt TIMESTAMPTZ DEFAULT now()";

const INVOICE_LINE_ITEMS: &str = "\
Table: InvoiceLineItems
- LineItemID SERIAL PRIMARY KEY
- InvoiceRecordID INT REFERENCES Invoices(InvoiceRecordID) ON DELETE CASCADE
- InvoiceID VARCHAR(255)
- PONumber VARCHAR(255)
- VendorName VARCHAR(255)
- ItemName TEXT
- Quantity NUMERIC(18,3)
- UnitPrice NUMERIC(18,2)
- AmountWithoutTax NUMERIC(18,2)
- ExpectedTaxAmount NUMERIC(18,2)
- TaxPercentage NUMERIC(5,2)
- TotalPriceWithTax NUMERIC(18,2)";

const MASTER_PO_DATA: &str = "\
Table: MasterPOData
- id SERIAL PRIMARY KEY
- PONumber VARCHAR(255)
- VendorName VARCHAR(255)
- OrderDate DATE
- ItemName TEXT
- Quantity NUMERIC(18,3)
- UnitPrice NUMERIC(18,2)
- AmountWithoutTax NUMERIC(18,2)
- TaxPercentage NUMERIC(5,2)
- ExpectedTaxAmount NUMERIC(18,2)
- TotalPriceWithTax NUMERIC(18,2)";

const CONTRACTS: &str = "\
Table: Contracts
- id SERIAL PRIMARY KEY
- _SourceDocumentFileName VARCHAR(500)
- _ProcessingTimestampUTC TIMESTAMPTZ DEFAULT now()
- SupplierName TEXT
- BuyerName TEXT
- ContractValidityStartDate DATE
- ContractValidityEndDate DATE
- ItemName TEXT
- ItemDescription TEXT
- UnitPrice DOUBLE PRECISION
- MaxItem DOUBLE PRECISION
- DeliveryDays INT
- DeliveryPenaltyAmount DOUBLE PRECISION
- DeliveryPenaltyAmountperDay DOUBLE PRECISION
- DeliveryPenaltyRate DOUBLE PRECISION
- DeliveryPenaltyRateperDay DOUBLE PRECISION
- MaximumTaxCharge DOUBLE PRECISION
- OtherRuleBreakClausesAmount DOUBLE PRECISION
- OtherRuleBreakClausesRate DOUBLE PRECISION
- _RawExtractedItemJsonData TEXT";

/// The four queryable tables, formatted for embedding in a tool description.
pub fn schema_overview() -> String {
    format!("{INVOICES}\n\n{INVOICE_LINE_ITEMS}\n\n{MASTER_PO_DATA}\n\n{CONTRACTS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_lists_all_four_tables() {
        let overview = schema_overview();
        for table in [
            "Table: Invoices",
            "Table: InvoiceLineItems",
            "Table: MasterPOData",
            "Table: Contracts",
        ] {
            assert!(overview.contains(table), "missing {table}");
        }
    }
}
