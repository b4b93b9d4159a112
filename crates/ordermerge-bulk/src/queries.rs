//! GraphQL documents sent to the Shopify Admin API.

/// Bulk query that exports every product variant's `id` and `sku`.
///
/// Each line of the resulting JSONL artifact is one `{"id": ..., "sku": ...}`
/// object; there are no nested connections, so no `__parentId` lines appear.
pub const PRODUCT_VARIANT_SKUS: &str = r"{
  productVariants {
    edges {
      node {
        id
        sku
      }
    }
  }
}";

/// Mutation that starts a bulk operation for the query passed as `$query`.
pub const BULK_OPERATION_RUN_QUERY: &str = r"mutation bulkOperationRunQuery($query: String!) {
  bulkOperationRunQuery(query: $query) {
    bulkOperation {
      id
      status
    }
    userErrors {
      field
      message
    }
  }
}";

/// Status lookup for a single bulk operation by GID.
pub const BULK_OPERATION_STATUS: &str = r"query getBulkStatus($id: ID!) {
  node(id: $id) {
    ... on BulkOperation {
      id
      status
      errorCode
      objectCount
      url
      completedAt
    }
  }
}";
