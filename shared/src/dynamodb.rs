use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};

#[async_trait]
pub trait Tables {
    /// Returns [`Error::NotFound`] when the table does not exist.
    async fn delete_table(&self, name: &str) -> Result<()>;
    /// Creates an on-demand table keyed by a single string attribute.
    async fn create_table(&self, name: &str, hash_key: &str) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct DynamoDb {
    inner: aws_sdk_dynamodb::Client,
}

impl DynamoDb {
    pub fn new(inner: aws_sdk_dynamodb::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Tables for DynamoDb {
    async fn delete_table(&self, name: &str) -> Result<()> {
        match self.inner.delete_table().table_name(name).send().await {
            Ok(_) => Ok(()),
            Err(e) => match e.into_service_error() {
                e if e.is_resource_not_found_exception() => Err(Error::not_found("table", name)),
                e => Err(Error::remote("DeleteTable", e)),
            },
        }
    }

    async fn create_table(&self, name: &str, hash_key: &str) -> Result<()> {
        let attribute = AttributeDefinition::builder()
            .attribute_name(hash_key)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| Error::remote("CreateTable", e))?;
        let key = KeySchemaElement::builder()
            .attribute_name(hash_key)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| Error::remote("CreateTable", e))?;

        self.inner
            .create_table()
            .table_name(name)
            .attribute_definitions(attribute)
            .key_schema(key)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|e| Error::remote("CreateTable", e.into_service_error()))?;

        Ok(())
    }
}
