use crate::error::{Error, Result};
use serde::de::DeserializeOwned;

pub async fn get_from_json<T>(
    s3: &aws_sdk_s3::Client,
    bucket_name: &str,
    object_key: &str,
) -> Result<T>
where
    T: DeserializeOwned,
{
    let object = s3
        .get_object()
        .bucket(bucket_name)
        .key(object_key)
        .send()
        .await
        .map_err(|e| match e.into_service_error() {
            e if e.is_no_such_key() => {
                Error::not_found("object", format!("s3://{}/{}", bucket_name, object_key))
            }
            e => Error::remote("GetObject", e),
        })?;

    let bytes = object
        .body
        .collect()
        .await
        .map_err(|e| Error::remote("GetObject", e))?
        .into_bytes();

    let obj = serde_json::from_slice(&bytes)?;

    Ok(obj)
}
