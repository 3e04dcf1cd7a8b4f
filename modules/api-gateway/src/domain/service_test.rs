use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use customers_sdk::{
    CustomersClientV1, CustomersError, NewOwner, NewPet, Owner, OwnerName, Pet, PetType,
};
use petclinic_transport_grpc::{BreakerState, CircuitBreaker, CircuitBreakerConfig};
use visits_sdk::{NewVisit, Visit, VisitsClientV1, VisitsError};

use super::error::DomainError;
use super::service::{Service, merge_visits};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pet(id: i32) -> Pet {
    Pet {
        id,
        name: format!("pet-{id}"),
        birth_date: date(2020, 1, 1),
        pet_type: PetType {
            id: 1,
            name: "cat".to_owned(),
        },
        owner: None,
    }
}

fn owner(id: i32, pet_ids: &[i32]) -> Owner {
    Owner {
        id,
        first_name: "George".to_owned(),
        last_name: "Franklin".to_owned(),
        address: "110 W. Liberty St.".to_owned(),
        city: "Madison".to_owned(),
        telephone: "6085551023".to_owned(),
        pets: pet_ids.iter().copied().map(pet).collect(),
    }
}

fn visit(id: i32, pet_id: i32, description: &str) -> Visit {
    Visit {
        id,
        pet_id,
        date: date(2024, 1, 5),
        description: description.to_owned(),
    }
}

fn new_owner() -> NewOwner {
    NewOwner {
        first_name: "Betty".to_owned(),
        last_name: "Davis".to_owned(),
        address: "638 Cardinal Ave.".to_owned(),
        city: "Sun Prairie".to_owned(),
        telephone: "6085551749".to_owned(),
    }
}

// Mock directory holding a fixed set of owners
struct MockCustomers {
    owners: Vec<Owner>,
    fail: bool,
}

impl MockCustomers {
    fn with(owners: Vec<Owner>) -> Self {
        Self {
            owners,
            fail: false,
        }
    }

    fn check(&self) -> Result<(), CustomersError> {
        if self.fail {
            return Err(CustomersError::Transport("Unavailable: down".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl CustomersClientV1 for MockCustomers {
    async fn find_owner(&self, owner_id: i32) -> Result<Option<Owner>, CustomersError> {
        self.check()?;
        Ok(self.owners.iter().find(|o| o.id == owner_id).cloned())
    }

    async fn find_all_owners(&self) -> Result<Vec<Owner>, CustomersError> {
        self.check()?;
        Ok(self.owners.clone())
    }

    async fn create_owner(&self, owner: NewOwner) -> Result<Owner, CustomersError> {
        self.check()?;
        Ok(Owner {
            id: 42,
            first_name: owner.first_name,
            last_name: owner.last_name,
            address: owner.address,
            city: owner.city,
            telephone: owner.telephone,
            pets: Vec::new(),
        })
    }

    async fn update_owner(&self, owner_id: i32, _owner: NewOwner) -> Result<(), CustomersError> {
        self.check()?;
        if self.owners.iter().any(|o| o.id == owner_id) {
            Ok(())
        } else {
            Err(CustomersError::NotFound {
                resource: "owner",
                id: owner_id,
            })
        }
    }

    async fn get_pet_types(&self) -> Result<Vec<PetType>, CustomersError> {
        self.check()?;
        Ok(vec![PetType {
            id: 1,
            name: "cat".to_owned(),
        }])
    }

    async fn create_pet(&self, owner_id: i32, new_pet: NewPet) -> Result<Pet, CustomersError> {
        self.check()?;
        if !self.owners.iter().any(|o| o.id == owner_id) {
            return Err(CustomersError::NotFound {
                resource: "owner",
                id: owner_id,
            });
        }
        Ok(Pet {
            id: 77,
            name: new_pet.name,
            birth_date: new_pet.birth_date,
            pet_type: PetType {
                id: new_pet.type_id,
                name: "dog".to_owned(),
            },
            owner: None,
        })
    }

    async fn update_pet(&self, pet_id: i32, _pet: NewPet) -> Result<(), CustomersError> {
        self.find_pet(pet_id).await.map(|_| ())
    }

    async fn find_pet(&self, pet_id: i32) -> Result<Pet, CustomersError> {
        self.check()?;
        self.owners
            .iter()
            .find_map(|o| {
                o.pets.iter().find(|p| p.id == pet_id).map(|p| Pet {
                    owner: Some(OwnerName {
                        id: o.id,
                        first_name: o.first_name.clone(),
                        last_name: o.last_name.clone(),
                    }),
                    ..p.clone()
                })
            })
            .ok_or(CustomersError::NotFound {
                resource: "pet",
                id: pet_id,
            })
    }
}

enum VisitsBehavior {
    Answer(Vec<Visit>),
    Fail,
    Hang,
    // the service does not know any of the requested pets
    UnknownPet,
}

// Mock visit history counting the calls that reach it
struct MockVisits {
    behavior: VisitsBehavior,
    calls: AtomicU32,
    last_pet_ids: std::sync::Mutex<Vec<i32>>,
}

impl MockVisits {
    fn new(behavior: VisitsBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicU32::new(0),
            last_pet_ids: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisitsClientV1 for MockVisits {
    async fn find_visits_by_pet_ids(&self, pet_ids: &[i32]) -> Result<Vec<Visit>, VisitsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_pet_ids.lock().unwrap() = pet_ids.to_vec();
        match &self.behavior {
            VisitsBehavior::Answer(visits) => Ok(visits
                .iter()
                .filter(|v| pet_ids.contains(&v.pet_id))
                .cloned()
                .collect()),
            VisitsBehavior::Fail => Err(VisitsError::Transport("Unavailable: down".to_owned())),
            VisitsBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            VisitsBehavior::UnknownPet => Err(VisitsError::NotFound {
                pet_id: pet_ids.first().copied().unwrap_or_default(),
            }),
        }
    }

    async fn create_visit(&self, visit: NewVisit) -> Result<Visit, VisitsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            VisitsBehavior::Fail => Err(VisitsError::Internal("Internal: db".to_owned())),
            VisitsBehavior::UnknownPet => Err(VisitsError::NotFound {
                pet_id: visit.pet_id,
            }),
            _ => Ok(Visit {
                id: 500,
                pet_id: visit.pet_id,
                date: visit.date,
                description: visit.description,
            }),
        }
    }
}

fn breaker() -> Arc<CircuitBreaker> {
    Arc::new(CircuitBreaker::new(
        "visits",
        CircuitBreakerConfig::default()
            .with_failure_threshold(3)
            .with_cooldown(Duration::from_secs(30))
            .with_call_timeout(Duration::from_secs(2)),
    ))
}

fn service(customers: MockCustomers, visits: &Arc<MockVisits>) -> Service {
    Service::new(Arc::new(customers), visits.clone(), breaker())
}

#[tokio::test]
async fn owner_visits_are_attached_to_matching_pet() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Answer(vec![visit(
        100, 10, "checkup",
    )])));
    let svc = service(MockCustomers::with(vec![owner(1, &[10])]), &visits);

    let details = svc.get_owner_with_visits(1).await.unwrap();

    assert_eq!(details.pets.len(), 1);
    assert_eq!(details.pets[0].visits, vec![visit(100, 10, "checkup")]);
    assert_eq!(*visits.last_pet_ids.lock().unwrap(), vec![10]);
}

#[tokio::test(start_paused = true)]
async fn slow_visits_service_yields_empty_visits() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Hang));
    let svc = service(MockCustomers::with(vec![owner(2, &[20])]), &visits);

    let details = svc.get_owner_with_visits(2).await.unwrap();

    assert_eq!(details.pets.len(), 1);
    assert!(details.pets[0].visits.is_empty());
    assert_eq!(svc.visits_breaker_snapshot().consecutive_failures, 1);
}

#[tokio::test]
async fn failing_visits_service_never_fails_owner_read() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Fail));
    let svc = service(MockCustomers::with(vec![owner(1, &[10, 11, 12])]), &visits);

    let details = svc.get_owner_with_visits(1).await.unwrap();

    assert_eq!(
        details.pets.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![10, 11, 12]
    );
    assert!(details.pets.iter().all(|p| p.visits.is_empty()));
}

#[tokio::test]
async fn unknown_owner_is_not_found_regardless_of_breaker() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Fail));
    let svc = service(MockCustomers::with(vec![owner(1, &[10])]), &visits);

    for _ in 0..3 {
        svc.get_owner_with_visits(1).await.unwrap();
    }
    assert_eq!(svc.visits_breaker_snapshot().state, BreakerState::Open);

    let err = svc.get_owner_with_visits(99).await.unwrap_err();
    assert!(matches!(err, DomainError::OwnerNotFound(99)));
}

#[tokio::test(start_paused = true)]
async fn open_breaker_skips_visits_until_cooldown_elapses() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Fail));
    let svc = service(MockCustomers::with(vec![owner(1, &[10])]), &visits);

    for _ in 0..3 {
        svc.get_owner_with_visits(1).await.unwrap();
    }
    assert_eq!(visits.calls(), 3);

    svc.get_owner_with_visits(1).await.unwrap();
    assert_eq!(visits.calls(), 3, "open breaker must not call the service");

    tokio::time::advance(Duration::from_secs(31)).await;
    svc.get_owner_with_visits(1).await.unwrap();
    assert_eq!(visits.calls(), 4, "probe after cooldown");
}

#[tokio::test(start_paused = true)]
async fn successful_probe_restores_visits() {
    let healthy = Arc::new(MockVisits::new(VisitsBehavior::Answer(vec![visit(
        1, 10, "x-ray",
    )])));
    let failing = Arc::new(MockVisits::new(VisitsBehavior::Fail));
    let shared_breaker = breaker();
    let customers = Arc::new(MockCustomers::with(vec![owner(1, &[10])]));

    let broken = Service::new(customers.clone(), failing, shared_breaker.clone());
    for _ in 0..3 {
        broken.get_owner_with_visits(1).await.unwrap();
    }
    assert_eq!(shared_breaker.state(), BreakerState::Open);

    let recovered = Service::new(customers, healthy, shared_breaker.clone());
    assert!(
        recovered.get_owner_with_visits(1).await.unwrap().pets[0]
            .visits
            .is_empty()
    );

    tokio::time::advance(Duration::from_secs(31)).await;
    let details = recovered.get_owner_with_visits(1).await.unwrap();
    assert_eq!(details.pets[0].visits.len(), 1);
    assert_eq!(shared_breaker.state(), BreakerState::Closed);
}

#[tokio::test]
async fn owner_without_pets_still_queries_visits_with_empty_set() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Answer(Vec::new())));
    let svc = service(MockCustomers::with(vec![owner(3, &[])]), &visits);

    let details = svc.get_owner_with_visits(3).await.unwrap();

    assert!(details.pets.is_empty());
    assert_eq!(visits.calls(), 1);
    assert!(visits.last_pet_ids.lock().unwrap().is_empty());
}

#[tokio::test]
async fn directory_failure_is_reported() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Answer(Vec::new())));
    let mut customers = MockCustomers::with(vec![owner(1, &[10])]);
    customers.fail = true;
    let svc = service(customers, &visits);

    let err = svc.get_owner_with_visits(1).await.unwrap_err();
    assert!(matches!(err, DomainError::Customers(_)));
    assert_eq!(visits.calls(), 0);
}

#[tokio::test]
async fn list_owners_never_calls_visits() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Answer(vec![visit(
        1, 10, "x",
    )])));
    let svc = service(
        MockCustomers::with(vec![owner(1, &[10]), owner(2, &[20])]),
        &visits,
    );

    let owners = svc.list_owners().await.unwrap();

    assert_eq!(owners.len(), 2);
    assert!(owners.iter().flat_map(|o| &o.pets).all(|p| p.visits.is_empty()));
    assert_eq!(visits.calls(), 0);
}

#[tokio::test]
async fn create_owner_returns_stored_record() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Fail));
    let svc = service(MockCustomers::with(Vec::new()), &visits);

    let created = svc.create_owner(new_owner()).await.unwrap();
    assert_eq!(created.id, 42);
    assert_eq!(created.last_name, "Davis");
}

#[tokio::test]
async fn update_unknown_owner_is_not_found() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Fail));
    let svc = service(MockCustomers::with(vec![owner(1, &[])]), &visits);

    svc.update_owner(1, new_owner()).await.unwrap();
    let err = svc.update_owner(5, new_owner()).await.unwrap_err();
    assert!(matches!(err, DomainError::OwnerNotFound(5)));
}

#[tokio::test]
async fn pet_passthroughs() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Fail));
    let svc = service(MockCustomers::with(vec![owner(1, &[10])]), &visits);
    let new_pet = NewPet {
        name: "Rosy".to_owned(),
        birth_date: date(2011, 4, 17),
        type_id: 2,
    };

    let created = svc.create_pet(1, new_pet.clone()).await.unwrap();
    assert_eq!(created.id, 77);
    assert!(created.visits.is_empty());

    let err = svc.create_pet(9, new_pet.clone()).await.unwrap_err();
    assert!(matches!(err, DomainError::OwnerNotFound(9)));

    let found = svc.find_pet(10).await.unwrap();
    assert_eq!(found.owner.as_deref(), Some("George Franklin"));

    let err = svc.update_pet(11, new_pet).await.unwrap_err();
    assert!(matches!(err, DomainError::PetNotFound(11)));

    assert_eq!(svc.list_pet_types().await.unwrap().len(), 1);
}

#[tokio::test]
async fn pet_visit_listing_reports_failures() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Fail));
    let svc = service(MockCustomers::with(Vec::new()), &visits);

    let err = svc.list_visits_for_pet(10).await.unwrap_err();
    assert!(matches!(err, DomainError::Visits(VisitsError::Transport(_))));
}

#[tokio::test]
async fn unknown_pet_in_visits_service() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::UnknownPet));
    let svc = service(MockCustomers::with(vec![owner(1, &[10])]), &visits);

    let details = svc.get_owner_with_visits(1).await.unwrap();
    assert!(details.pets[0].visits.is_empty());
    assert_eq!(svc.visits_breaker_snapshot().consecutive_failures, 1);

    let err = svc.list_visits_for_pet(10).await.unwrap_err();
    assert!(matches!(err, DomainError::PetNotFound(10)));

    let err = svc
        .create_visit(
            10,
            NewVisit {
                pet_id: 0,
                date: date(2024, 1, 5),
                description: "checkup".to_owned(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PetNotFound(10)));
}

#[tokio::test]
async fn create_visit_uses_path_pet_id() {
    let visits = Arc::new(MockVisits::new(VisitsBehavior::Answer(Vec::new())));
    let svc = service(MockCustomers::with(Vec::new()), &visits);

    let created = svc
        .create_visit(
            10,
            NewVisit {
                pet_id: 0,
                date: date(2024, 1, 5),
                description: "checkup".to_owned(),
            },
        )
        .await
        .unwrap();

    assert_eq!(created.pet_id, 10);
    assert_eq!(created.id, 500);

    let err = svc
        .create_visit(
            0,
            NewVisit {
                pet_id: 0,
                date: date(2024, 1, 5),
                description: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn merge_preserves_pet_order_and_drops_foreign_visits() {
    let visits = vec![
        visit(1, 12, "a"),
        visit(2, 10, "b"),
        visit(3, 99, "stray"),
        visit(4, 12, "c"),
    ];

    let details = merge_visits(owner(1, &[12, 10, 11]), &visits);

    let ids: Vec<_> = details.pets.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![12, 10, 11]);

    let per_pet: Vec<Vec<i32>> = details
        .pets
        .iter()
        .map(|p| p.visits.iter().map(|v| v.id).collect())
        .collect();
    assert_eq!(per_pet, vec![vec![1, 4], vec![2], vec![]]);

    for pet in &details.pets {
        assert!(pet.visits.iter().all(|v| v.pet_id == pet.id));
    }
}
