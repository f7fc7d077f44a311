pub mod routes;

pub mod assignments {
    pub mod assignments_handlers;
    pub mod assignments_models;
}

pub mod queues {
    pub mod queues_handlers;
    pub mod queues_models;
}

pub mod workers {
    pub mod workers_handlers;
    pub mod workers_models;
}
