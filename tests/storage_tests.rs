use legalaid_portal::storage::{MockStorageService, S3StorageClient, StorageService};
use uuid::Uuid;

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_upload_success() {
        let mock = MockStorageService::new();
        let key = "documents/case-1/id_card.pdf";
        let result = mock.presigned_upload_url(key, "application/pdf").await;
        assert!(result.is_ok());

        let url = result.unwrap();
        assert!(url.contains("signature=fake"));
        assert!(url.contains(key));
    }

    #[tokio::test]
    async fn test_mock_download_success() {
        let mock = MockStorageService::new();
        let result = mock.presigned_download_url("documents/case-1/report.pdf").await;
        assert!(result.is_ok());
        assert!(result.unwrap().contains("download=1"));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockStorageService::new_failing();
        assert!(mock.presigned_upload_url("a.pdf", "application/pdf").await.is_err());
        assert!(mock.presigned_download_url("a.pdf").await.is_err());
        assert!(mock.delete_object("a.pdf").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_sanitization() {
        let mock = MockStorageService::new();
        let result = mock
            .presigned_upload_url("../../etc/passwd", "text/plain")
            .await;
        assert!(result.is_ok());

        let url = result.unwrap();
        assert!(!url.contains(".."));
    }

    #[tokio::test]
    async fn test_mock_delete_is_ok() {
        let mock = MockStorageService::new();
        assert!(mock.delete_object("documents/any").await.is_ok());
    }
}

#[cfg(test)]
mod s3_tests {
    use super::*;

    #[tokio::test]
    async fn test_s3_client_creation() {
        let _client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
        )
        .await;
        // Construction must not panic.
    }

    #[tokio::test]
    async fn test_s3_presigned_upload_url_format() {
        let client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
        )
        .await;

        let key = format!("documents/{}/evidence.pdf", Uuid::new_v4());
        let result = client.presigned_upload_url(&key, "application/pdf").await;

        assert!(result.is_ok());
        let url = result.unwrap();
        assert!(url.contains("localhost:9000"));
        assert!(url.contains(&key));
    }

    #[tokio::test]
    async fn test_s3_presigned_download_url_format() {
        let client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
        )
        .await;

        let key = format!("documents/{}/evidence.pdf", Uuid::new_v4());
        let result = client.presigned_download_url(&key).await;

        assert!(result.is_ok());
        assert!(result.unwrap().contains(&key));
    }
}
