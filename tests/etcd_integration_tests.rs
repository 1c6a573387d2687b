// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the etcd store using Docker containers.

mod common;

#[cfg(feature = "etcd")]
mod etcd_tests {
    use hsconfig::adapters::EtcdStore;
    use hsconfig::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use testcontainers::{core::WaitFor, runners::AsyncRunner, GenericImage, ImageExt};

    use crate::common as docker_helpers;
    use crate::common::doc;

    /// Starts an etcd container and returns it with its client endpoint.
    async fn start_etcd() -> Option<(testcontainers::ContainerAsync<GenericImage>, String)> {
        if !docker_helpers::is_docker_available() {
            docker_helpers::print_docker_unavailable_warning("etcd integration test");
            return None;
        }

        let etcd_image = GenericImage::new("quay.io/coreos/etcd", "v3.5.0")
            .with_exposed_port(2379.into())
            .with_wait_for(WaitFor::message_on_stderr("ready to serve client requests"))
            .with_env_var("ETCD_ADVERTISE_CLIENT_URLS", "http://0.0.0.0:2379")
            .with_env_var("ETCD_LISTEN_CLIENT_URLS", "http://0.0.0.0:2379");

        let container = etcd_image.start().await.ok()?;
        let port = container.get_host_port_ipv4(2379).await.ok()?;

        // Give etcd a moment to fully start
        tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;

        Some((container, format!("127.0.0.1:{}", port)))
    }

    async fn setup_etcd_test() -> Option<(testcontainers::ContainerAsync<GenericImage>, String, EtcdStore)>
    {
        let (container, endpoint) = start_etcd().await?;
        let store = EtcdStore::new(vec![endpoint.clone()], Some("hsconfig/"))
            .await
            .ok()?;
        Some((container, endpoint, store))
    }

    #[tokio::test]
    async fn test_etcd_round_trip() {
        let Some((_container, _endpoint, store)) = setup_etcd_test().await else {
            return;
        };
        let domain = DomainId::from("a.example.com");

        assert!(store
            .get_record(&domain, Deadline::none())
            .await
            .unwrap()
            .is_none());

        store
            .upsert_record(&domain, &doc(json!({"ui": {"theme": "dark"}})), Deadline::none())
            .await
            .unwrap();
        assert_eq!(
            store.get_record(&domain, Deadline::none()).await.unwrap(),
            Some(doc(json!({"ui": {"theme": "dark"}})))
        );

        store.delete_record(&domain, Deadline::none()).await.unwrap();
        assert!(store
            .get_record(&domain, Deadline::none())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_etcd_lists_only_prefixed_templates() {
        let Some((_container, endpoint, store)) = setup_etcd_test().await else {
            return;
        };

        let mut client = etcd_client::Client::connect([&endpoint], None).await.unwrap();
        client.put("other/*.example.com", "{}", None).await.unwrap();
        client.put("hsconfig/*.example.org", "{}", None).await.unwrap();
        client.put("hsconfig/a.example.org", "{}", None).await.unwrap();

        assert_eq!(
            store.list_wildcard_domains(Deadline::none()).await.unwrap(),
            vec![DomainId::from("*.example.org")]
        );
    }

    #[tokio::test]
    async fn test_etcd_backed_service() {
        let Some((_container, _endpoint, store)) = setup_etcd_test().await else {
            return;
        };

        let service = CachedConfigService::builder()
            .with_shared_store(Arc::new(store))
            .without_sweeper()
            .build()
            .unwrap();

        service
            .set_config(
                &DomainId::from("*"),
                Some(doc(json!({"lang": "en", "theme": "light"}))),
                Deadline::none(),
            )
            .await
            .unwrap();
        service
            .set_config(
                &DomainId::from("*.example.org"),
                Some(doc(json!({"hstoday.weight": 5, "theme": "dark"}))),
                Deadline::none(),
            )
            .await
            .unwrap();

        let effective = service
            .get_effective_config(&DomainId::from("a.example.org"), Deadline::none())
            .await
            .unwrap();
        assert_eq!(effective, doc(json!({"lang": "en", "theme": "dark"})));
    }
}
